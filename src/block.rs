use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => format!("{}", n),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mutation {
    pub name: String,
    pub params: Vec<String>,
    pub warp: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub id: String,
    pub kind: String,
    pub comment: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub values: BTreeMap<String, Block>,
    pub statements: BTreeMap<String, Block>,
    pub next: Option<Box<Block>>,
    pub mutation: Option<Mutation>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(FieldValue::as_text)
    }

    pub fn value_input(&self, name: &str) -> Option<&Block> {
        self.values.get(name)
    }

    pub fn statement_input(&self, name: &str) -> Option<&Block> {
        self.statements.get(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Project {
    pub variables: Vec<String>,
    pub roots: Vec<Block>,
}
