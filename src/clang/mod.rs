pub mod event;
pub mod logic;
pub mod looks;
pub mod loops;
pub mod math;
pub mod motion;
pub mod procedures;
pub mod sensing;
pub mod variables;

use crate::block::{Block, Project};
use crate::names::{NameKind, Names, RESERVED_WORDS};
use anyhow::{bail, Result};
use regex::Regex;
use std::collections::HashMap;

pub const INDENT: &str = "  ";
const COMMENT_WRAP: usize = 60;
const FUNC_NAME_PLACEHOLDER: &str = "{FUNC_NAME}";

// Operator binding ranks for the C output. Lower binds tighter; the
// fractional sub-ranks keep same-class operators distinguishable for the
// override table below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Atomic,
    Member,
    FunctionCall,
    UnaryNegation,
    LogicalNot,
    Multiplication,
    Division,
    Modulus,
    Subtraction,
    Addition,
    Relational,
    Equality,
    LogicalAnd,
    LogicalOr,
    Conditional,
    Assignment,
    Comma,
    None,
}

impl Order {
    pub fn weight(self) -> f64 {
        match self {
            Order::Atomic => 0.0,
            Order::Member => 1.2,
            Order::FunctionCall => 2.0,
            Order::UnaryNegation => 4.3,
            Order::LogicalNot => 4.4,
            Order::Multiplication => 5.1,
            Order::Division => 5.2,
            Order::Modulus => 5.3,
            Order::Subtraction => 6.1,
            Order::Addition => 6.2,
            Order::Relational => 8.0,
            Order::Equality => 9.0,
            Order::LogicalAnd => 13.0,
            Order::LogicalOr => 14.0,
            Order::Conditional => 15.0,
            Order::Assignment => 16.0,
            Order::Comma => 18.0,
            Order::None => 99.0,
        }
    }
}

// Outer/inner pairings that never need parentheses even though the rank
// comparison alone would add them.
const ORDER_OVERRIDES: &[(Order, Order)] = &[
    (Order::FunctionCall, Order::Member),
    (Order::FunctionCall, Order::FunctionCall),
    (Order::Member, Order::Member),
    (Order::Member, Order::FunctionCall),
    (Order::LogicalNot, Order::LogicalNot),
    (Order::Multiplication, Order::Multiplication),
    (Order::Addition, Order::Addition),
    (Order::LogicalAnd, Order::LogicalAnd),
    (Order::LogicalOr, Order::LogicalOr),
];

pub fn needs_parens(outer: Order, inner: Order) -> bool {
    let outer_class = outer.weight().floor();
    let inner_class = inner.weight().floor();
    if outer_class > inner_class {
        return false;
    }
    if outer_class == inner_class && (outer_class == 0.0 || outer_class == 99.0) {
        return false;
    }
    !ORDER_OVERRIDES.contains(&(outer, inner))
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub statement_prefix: Option<String>,
    pub statement_suffix: Option<String>,
    pub infinite_loop_trap: Option<String>,
}

// One Generator value is one emission context: name table, helper
// definitions, and pending loop fragments live exactly as long as a single
// generate() run.
pub struct Generator {
    config: GeneratorConfig,
    names: Names,
    definitions: Vec<(String, String)>,
    helper_names: HashMap<String, String>,
    loop_fragments: Vec<String>,
    builtin_loop_calls: Vec<String>,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            names: Names::new(RESERVED_WORDS),
            definitions: Vec::new(),
            helper_names: HashMap::new(),
            loop_fragments: Vec::new(),
            builtin_loop_calls: Vec::new(),
        }
    }

    pub fn generate(&mut self, project: &Project) -> Result<String> {
        self.reset();
        self.declare_variables(project);

        let procedures = project
            .roots
            .iter()
            .filter(|b| b.kind == "procedures_definition");
        let loop_roots = project
            .roots
            .iter()
            .filter(|b| b.kind == "event_when_wobot_loop");
        let start_roots = project
            .roots
            .iter()
            .filter(|b| b.kind == "event_when_wobot_started");

        // Procedures first so calls resolve to already-allocated names.
        for block in procedures {
            self.block_chain_to_code(block)?;
        }

        for block in loop_roots {
            let body = match block.next.as_deref() {
                Some(first) => self.block_chain_to_code(first)?,
                None => String::new(),
            };
            // An empty loop handler is a no-op rather than an error.
            if !body.trim().is_empty() {
                self.loop_fragments.push(body);
            }
        }

        let mut sections = Vec::new();
        for block in start_roots {
            let code = self.block_chain_to_code(block)?;
            if !code.is_empty() {
                sections.push(code);
            }
        }

        Ok(self.finish(&sections.join("\n")))
    }

    fn reset(&mut self) {
        self.names.reset();
        self.definitions.clear();
        self.helper_names.clear();
        self.loop_fragments.clear();
        self.builtin_loop_calls.clear();
    }

    fn declare_variables(&mut self, project: &Project) {
        let mut declared = Vec::new();
        for variable in &project.variables {
            declared.push(self.names.get_name(variable, NameKind::Variable));
        }
        if !declared.is_empty() {
            let line = format!("float {} = 0.0;", declared.join(" = 0.0, "));
            self.definitions.push(("variables".to_string(), line));
        }
    }

    // One statement block plus its comment and the rest of its chain.
    fn block_chain_to_code(&mut self, block: &Block) -> Result<String> {
        let code = self.statement_rule(block)?;
        let comment_code = self.comment_code(block);
        let next_code = match block.next.as_deref() {
            Some(next) => self.block_chain_to_code(next)?,
            None => String::new(),
        };
        Ok(format!("{}{}{}", comment_code, code, next_code))
    }

    fn comment_code(&self, block: &Block) -> String {
        let mut out = String::new();
        if let Some(comment) = &block.comment {
            let wrapped = wrap_comment(comment, COMMENT_WRAP - 3);
            out.push_str(&prefix_lines(&format!("{}\n", wrapped), "// "));
        }
        // Comments buried in expression subtrees surface on the statement
        // that uses them; nested statements handle their own.
        for child in block.values.values() {
            let nested = all_nested_comments(child);
            if !nested.is_empty() {
                out.push_str(&prefix_lines(&nested, "// "));
            }
        }
        out
    }

    pub fn statement_to_code(&mut self, block: &Block, slot: &str) -> Result<String> {
        match block.statement_input(slot) {
            Some(first) => {
                let code = self.block_chain_to_code(first)?;
                Ok(prefix_lines(&code, INDENT))
            }
            None => Ok(String::new()),
        }
    }

    pub fn value_to_code(
        &mut self,
        block: &Block,
        slot: &str,
        outer: Order,
    ) -> Result<Option<String>> {
        let Some(child) = block.value_input(slot) else {
            return Ok(None);
        };
        let (code, inner) = self.expression_rule(child)?;
        if code.is_empty() {
            return Ok(None);
        }
        if needs_parens(outer, inner) {
            Ok(Some(format!("({})", code)))
        } else {
            Ok(Some(code))
        }
    }

    // Empty-slot defaults belong to the calling rule, not the emitter.
    pub fn value_or(
        &mut self,
        block: &Block,
        slot: &str,
        outer: Order,
        default: &str,
    ) -> Result<String> {
        Ok(self
            .value_to_code(block, slot, outer)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn names_mut(&mut self) -> &mut Names {
        &mut self.names
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn variable_name(&mut self, block: &Block, field: &str) -> Result<String> {
        match block.field_text(field) {
            Some(name) => Ok(self.names.get_name(&name, NameKind::Variable)),
            None => bail!(
                "Block '{}' ({}) is missing its '{}' field.",
                block.id,
                block.kind,
                field
            ),
        }
    }

    pub fn provide_helper(&mut self, logical_name: &str, body_lines: &[&str]) -> String {
        // Keyed by logical name only; every helper body here is a fixed
        // template, so two requests can never want different bodies. A
        // parameterized helper would need the parameters in this key.
        if let Some(existing) = self.helper_names.get(logical_name) {
            return existing.clone();
        }
        let func_name = self
            .names
            .get_distinct_name(logical_name, NameKind::Procedure);
        let body = body_lines
            .join("\n")
            .replace(FUNC_NAME_PLACEHOLDER, &func_name);
        self.definitions.push((logical_name.to_string(), body));
        self.helper_names
            .insert(logical_name.to_string(), func_name.clone());
        func_name
    }

    pub fn register_definition(&mut self, key: String, code: String) {
        self.definitions.push((key, code));
    }

    // Recurring service calls spliced ahead of the loop fragments,
    // deduplicated by exact call text.
    pub fn register_builtin_loop_call(&mut self, call: String) {
        if !self.builtin_loop_calls.contains(&call) {
            self.builtin_loop_calls.push(call);
        }
    }

    pub fn inject_id(&self, hook: &str, block: &Block) -> String {
        hook.replace("%1", &format!("'{}'", block.id.replace('\'', "\\'")))
    }

    pub fn add_loop_trap(&self, branch: String, block: &Block) -> String {
        match &self.config.infinite_loop_trap {
            Some(trap) => format!(
                "{}{}",
                prefix_lines(&self.inject_id(trap, block), INDENT),
                branch
            ),
            None => branch,
        }
    }

    fn statement_rule(&mut self, block: &Block) -> Result<String> {
        match block.kind.as_str() {
            "event_when_wobot_started" => event::when_started(self, block),
            "event_when_wobot_loop" => event::when_loop(self, block),
            "control_if" => logic::control_if(self, block),
            "control_if_else" => logic::control_if_else(self, block),
            "controls_if" | "controls_ifelse" => logic::controls_if(self, block),
            "controls_repeat_ext" | "controls_repeat" => loops::repeat(self, block),
            "controls_whileUntil" => loops::while_until(self, block),
            "controls_for" => loops::for_loop(self, block),
            "controls_flow_statements" => loops::flow_statements(self, block),
            "variables_set" | "variables_set_dynamic" => variables::set(self, block),
            "math_change" => math::change(self, block),
            "procedures_definition" => procedures::definition(self, block),
            "procedures_call" => procedures::call(self, block),
            "procedures_ifreturn" => procedures::if_return(self, block),
            "motion_set_encoder_motor" => motion::set_encoder_motor(self, block),
            "motion_set_dc_motor" => motion::set_dc_motor(self, block),
            "motion_smart_servo_angle" => motion::smart_servo_angle(self, block),
            "motion_smart_servo" => motion::smart_servo(self, block),
            "motion_servo" => motion::servo(self, block),
            "motion_step_motor" => motion::step_motor(self, block),
            "motion_set_electromagnet" => motion::set_electromagnet(self, block),
            "motion_set_digital_output" => motion::set_digital_output(self, block),
            "looks_set_emotion" => looks::set_emotion(self, block),
            "looks_off_emotion" => looks::off_emotion(self, block),
            "looks_set_symbol" => looks::set_symbol(self, block),
            "looks_custom_led_matrix" => looks::custom_led_matrix(self, block),
            "looks_off_led_matrix" => looks::off_led_matrix(self, block),
            "looks_set_digital_tube" => looks::set_digital_tube(self, block),
            "looks_clear_digital_tube" => looks::clear_digital_tube(self, block),
            "looks_set_led_light_rgb" => looks::set_led_light_rgb(self, block),
            "looks_set_led_light_color" => looks::set_led_light_color(self, block),
            "looks_off_led_light" => looks::off_led_light(self, block),
            other => bail!("No statement rule registered for block kind '{}'.", other),
        }
    }

    fn expression_rule(&mut self, block: &Block) -> Result<(String, Order)> {
        match block.kind.as_str() {
            "math_number" | "math_whole_number" | "math_positive_number" => math::number(block),
            "math_arithmetic" => math::arithmetic(self, block),
            "math_single" | "math_round" | "math_trig" => math::single(self, block),
            "math_constant" => math::constant(block),
            "math_number_property" => math::number_property(self, block),
            "math_modulo" => math::modulo(self, block),
            "math_constrain" => math::constrain(self, block),
            "math_random_int" => math::random_int(self, block),
            "math_random_float" => math::random_float(),
            "math_atan2" => math::atan2(self, block),
            "logic_compare" => logic::compare(self, block),
            "logic_operation" => logic::operation(self, block),
            "logic_negate" => logic::negate(self, block),
            "logic_boolean" => logic::boolean(block),
            "logic_ternary" => logic::ternary(self, block),
            "variables_get" | "variables_get_dynamic" => variables::get(self, block),
            "argument_reporter_string_number" | "argument_reporter_boolean" => {
                procedures::argument_reporter(self, block)
            }
            "text" => Ok((
                quote(&block.field_text("TEXT").unwrap_or_default()),
                Order::Atomic,
            )),
            "sensing_gray_detected_line" => sensing::gray_detected_line(block),
            "sensing_bluetooth_receiver" => sensing::bluetooth_receiver(),
            "sensing_jointed_arm" => sensing::jointed_arm(block),
            "sensing_touch_button" => sensing::touch_button(block),
            "sensing_gyroscope" => sensing::gyroscope(block),
            "sensing_gray_value" => sensing::simple_port("gray_value", block),
            "sensing_flame_value" => sensing::simple_port("flame_value", block),
            "sensing_temperature_value" => sensing::simple_port("temperature_value", block),
            "sensing_humidity_value" => sensing::simple_port("humidity_value", block),
            "sensing_volume_value" => sensing::simple_port("volume_value", block),
            "sensing_ambient_light_value" => sensing::simple_port("ambient_light_value", block),
            "sensing_ultrasonic_detection_distance" => {
                sensing::simple_port("ultrasonic_detection_distance", block)
            }
            "sensing_gas_pressure" => sensing::simple_port("gas_pressure", block),
            "sensing_infrared_receiver" => sensing::simple_port("infrared_receiver", block),
            "sensing_potentiometer" => sensing::simple_port("potentiometer", block),
            "sensing_limit_switch" => sensing::simple_port("limit_switch", block),
            "sensing_water_temperature" => sensing::simple_port("water_temperature", block),
            "sensing_analog_input" => sensing::simple_port("analog_input", block),
            other => bail!("No expression rule registered for block kind '{}'.", other),
        }
    }

    fn finish(&mut self, setup_body: &str) -> String {
        let definitions = self
            .definitions
            .iter()
            .map(|(_, code)| code.clone())
            .collect::<Vec<_>>();

        let includes = "#include \"wobot.h\"";
        let default_func = "void setup() {\n  board_init();\n}";
        let mut entry_body = prefix_lines(setup_body, INDENT);
        if !entry_body.ends_with('\n') {
            entry_body.push('\n');
        }
        let entry = format!("void _setup(){{\n{}}}", entry_body);
        let loop_func = self.loop_code();

        let code = format!(
            "{}\n\n{}\n\n{}\n\n\n{}\n\n\n{}\n",
            includes,
            default_func,
            definitions.join("\n\n"),
            entry,
            loop_func
        );
        scrub_whitespace(&code)
    }

    fn loop_code(&self) -> String {
        let mut parts = self.builtin_loop_calls.clone();
        if !parts.is_empty() && !self.loop_fragments.is_empty() {
            parts.push(String::new());
        }
        for fragment in &self.loop_fragments {
            parts.push(fragment.trim_end().to_string());
        }
        format!(
            "void _loop(){{\n{}\n}}",
            prefix_lines(&parts.join("\n"), INDENT)
        )
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn prefix_lines(text: &str, prefix: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if !line.is_empty() {
            out.push_str(prefix);
            out.push_str(line);
        }
    }
    out
}

fn all_nested_comments(block: &Block) -> String {
    let mut out = String::new();
    if let Some(comment) = &block.comment {
        out.push_str(comment);
        out.push('\n');
    }
    for child in block.values.values() {
        out.push_str(&all_nested_comments(child));
    }
    for child in block.statements.values() {
        out.push_str(&all_nested_comments(child));
    }
    if let Some(next) = block.next.as_deref() {
        out.push_str(&all_nested_comments(next));
    }
    out
}

fn wrap_comment(text: &str, limit: usize) -> String {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut line = String::new();
        for word in source_line.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > limit {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}

pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

pub fn is_simple_operand(text: &str) -> bool {
    if text.trim().parse::<f64>().is_ok() {
        return true;
    }
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// 64-character bitmap rows into 8 row bytes, leftmost pixel as the high bit.
pub fn matrix_convert(matrix: &str) -> [u8; 8] {
    let mut padded: Vec<char> = matrix.chars().take(64).collect();
    while padded.len() < 64 {
        padded.push('0');
    }
    let mut rows = [0u8; 8];
    for (row_index, row) in padded.chunks(8).enumerate() {
        let mut value = 0u8;
        for (col, c) in row.iter().enumerate() {
            if *c != '0' {
                value |= 1 << (7 - col);
            }
        }
        rows[row_index] = value;
    }
    rows
}

fn scrub_whitespace(code: &str) -> String {
    let code = Regex::new(r"^\s*\n").unwrap().replace(code, "");
    let code = Regex::new(r"\n[ \t\n]+$").unwrap().replace(&code, "\n");
    let code = Regex::new(r"[ \t]+\n").unwrap().replace_all(&code, "\n");
    code.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parens_follow_the_override_table() {
        assert!(needs_parens(Order::Subtraction, Order::Subtraction));
        assert!(!needs_parens(Order::Addition, Order::Addition));
        assert!(!needs_parens(Order::LogicalAnd, Order::LogicalAnd));
        assert!(needs_parens(Order::LogicalAnd, Order::LogicalOr));
        assert!(!needs_parens(Order::Multiplication, Order::Atomic));
        assert!(!needs_parens(Order::None, Order::None));
        assert!(!needs_parens(Order::Atomic, Order::Atomic));
        // Same integer class, different sub-rank, no override: wrap.
        assert!(needs_parens(Order::Subtraction, Order::Addition));
    }

    #[test]
    fn helper_registration_is_idempotent() {
        let mut generator = Generator::new();
        let body = ["float {FUNC_NAME}(float a) {", "  return a;", "}"];
        let first = generator.provide_helper("math_noop", &body);
        let second = generator.provide_helper("math_noop", &body);
        assert_eq!(first, second);
        assert_eq!(generator.definitions.len(), 1);
        assert!(generator.definitions[0].1.contains(&first));
        assert!(!generator.definitions[0].1.contains(FUNC_NAME_PLACEHOLDER));
    }

    #[test]
    fn builtin_loop_calls_deduplicate_on_exact_text() {
        let mut generator = Generator::new();
        generator.register_builtin_loop_call("step_motor_loop(1);".to_string());
        generator.register_builtin_loop_call("step_motor_loop(1);".to_string());
        generator.register_builtin_loop_call("step_motor_loop(2);".to_string());
        assert_eq!(
            generator.builtin_loop_calls,
            vec![
                "step_motor_loop(1);".to_string(),
                "step_motor_loop(2);".to_string()
            ]
        );
    }

    #[test]
    fn quote_escapes_backslashes_quotes_and_newlines() {
        assert_eq!(quote(r#"say "hi"\now"#), r#""say \"hi\"\\now""#);
        assert_eq!(quote("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn matrix_rows_pack_left_pixel_high() {
        let mut bitmap = String::new();
        bitmap.push_str("10000000");
        bitmap.push_str("00000001");
        bitmap.push_str("11111111");
        let rows = matrix_convert(&bitmap);
        assert_eq!(rows[0], 0x80);
        assert_eq!(rows[1], 0x01);
        assert_eq!(rows[2], 0xFF);
        assert_eq!(rows[3], 0x00);
    }

    #[test]
    fn prefix_lines_skips_blank_lines() {
        assert_eq!(prefix_lines("a;\nb;\n", "  "), "  a;\n  b;\n");
        assert_eq!(prefix_lines("a;\n\nb;", "  "), "  a;\n\n  b;");
    }

    #[test]
    fn wrap_comment_breaks_long_lines() {
        let wrapped = wrap_comment(
            "a comment that keeps going and going well past the wrap limit set for it",
            20,
        );
        assert!(wrapped.lines().all(|l| l.len() <= 20));
        assert!(wrapped.lines().count() > 1);
    }
}
