use std::collections::{HashMap, HashSet};

// C keywords plus every runtime symbol the emitted program links against.
// Not a security feature, just keeps user names from clobbering the runtime.
pub const RESERVED_WORDS: &str = "auto,break,case,char,const,continue,default,do,double,else,enum,extern,\
float,for,goto,if,inline,int,long,register,restrict,return,short,signed,sizeof,static,struct,switch,\
typedef,union,unsigned,void,volatile,while,_Bool,true,false,\
main,setup,_setup,_loop,board_init,\
set_emotion,off_emotion,set_symbol,set_symbol_cust,off_led_matrix,set_digital_tube,clear_digital_tube,\
set_led_light_rgb,set_led_light_color,off_led_light,\
set_encoder_motor,set_dc_motor,set_smart_servo_angle,set_smart_servo,set_servo,set_step_motor,\
step_motor_loop,set_electromagnet,set_digital_output,\
gray_detected_line,gray_value,flame_value,temperature_value,humidity_value,volume_value,\
ambient_light_value,ultrasonic_detection_distance,gas_pressure,infrared_receiver,potentiometer,\
bluetooth_receiver,jointed_arm,touch_button,gyroscope,limit_switch,water_temperature,analog_input,\
pow,fabs,sqrt,log,exp,round,ceil,floor,sin,cos,tan,asin,acos,atan,atan2,fmod,fmin,fmax,rand,srand";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Variable,
    Parameter,
    Procedure,
}

impl NameKind {
    fn prefix(self) -> &'static str {
        match self {
            NameKind::Variable => "",
            NameKind::Parameter => "p_",
            NameKind::Procedure => "func_",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Names {
    reserved: HashSet<String>,
    db: HashMap<(NameKind, String), String>,
    used: HashSet<String>,
}

impl Names {
    pub fn new(reserved_words: &str) -> Self {
        Self {
            reserved: reserved_words
                .split(',')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
            db: HashMap::new(),
            used: HashSet::new(),
        }
    }

    pub fn reset(&mut self) {
        self.db.clear();
        self.used.clear();
    }

    pub fn get_name(&mut self, key: &str, kind: NameKind) -> String {
        let db_key = (kind, key.to_string());
        if let Some(existing) = self.db.get(&db_key) {
            return existing.clone();
        }
        let name = self.allocate(key, kind);
        self.db.insert(db_key, name.clone());
        name
    }

    pub fn get_distinct_name(&mut self, seed: &str, kind: NameKind) -> String {
        self.allocate(seed, kind)
    }

    fn allocate(&mut self, seed: &str, kind: NameKind) -> String {
        let base = format!("{}{}", kind.prefix(), sanitize(seed));
        let mut candidate = base.clone();
        let mut suffix = 2usize;
        while self.reserved.contains(&candidate) || self.used.contains(&candidate) {
            candidate = format!("{}{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

impl Default for Names {
    fn default() -> Self {
        Self::new(RESERVED_WORDS)
    }
}

pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_name() {
        let mut names = Names::default();
        let a = names.get_name("speed", NameKind::Variable);
        let b = names.get_name("speed", NameKind::Variable);
        assert_eq!(a, "speed");
        assert_eq!(a, b);
    }

    #[test]
    fn reserved_word_gets_suffixed() {
        let mut names = Names::default();
        assert_eq!(names.get_name("for", NameKind::Variable), "for2");
        assert_eq!(names.get_name("while", NameKind::Variable), "while2");
    }

    #[test]
    fn distinct_name_never_repeats() {
        let mut names = Names::default();
        let a = names.get_distinct_name("count", NameKind::Variable);
        let b = names.get_distinct_name("count", NameKind::Variable);
        let c = names.get_distinct_name("count", NameKind::Variable);
        assert_eq!(a, "count");
        assert_eq!(b, "count2");
        assert_eq!(c, "count3");
    }

    #[test]
    fn categories_share_one_identifier_pool() {
        let mut names = Names::default();
        let var = names.get_name("total", NameKind::Variable);
        let param = names.get_name("total", NameKind::Parameter);
        let proc_name = names.get_name("total", NameKind::Procedure);
        assert_eq!(var, "total");
        assert_eq!(param, "p_total");
        assert_eq!(proc_name, "func_total");
        // A variable landing on an already-claimed spelling is pushed off it.
        let clash = names.get_name("func_total", NameKind::Variable);
        assert_eq!(clash, "func_total2");
    }

    #[test]
    fn sanitize_rewrites_illegal_characters() {
        assert_eq!(sanitize("my var!"), "my_var_");
        assert_eq!(sanitize("3rd"), "_3rd");
        assert_eq!(sanitize(""), "_");
    }
}
