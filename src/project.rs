use crate::block::{Block, FieldValue, Mutation, Project};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

pub fn load_project(path: &Path) -> Result<Project> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", path.display()))?;
    parse_project_source(&source)
        .with_context(|| format!("Invalid project file '{}'.", path.display()))
}

pub fn parse_project_source(source: &str) -> Result<Project> {
    let root: Value = serde_json::from_str(source).context("Project file is not valid JSON.")?;

    let mut project = Project::default();
    if let Some(targets) = root.get("targets").and_then(Value::as_array) {
        for target in targets {
            load_target(target, &mut project)?;
        }
    } else {
        load_target(&root, &mut project)?;
    }
    Ok(project)
}

fn load_target(target: &Value, project: &mut Project) -> Result<()> {
    for name in read_variable_decls(target.get("variables")) {
        if !project.variables.contains(&name) {
            project.variables.push(name);
        }
    }

    let Some(blocks) = target.get("blocks").and_then(Value::as_object) else {
        bail!("Project target is missing a 'blocks' object.");
    };
    let comments = read_comment_map(target.get("comments"));

    let mut root_ids = Vec::new();
    for (id, block) in blocks {
        let top_level = block
            .get("topLevel")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let shadow = block.get("shadow").and_then(Value::as_bool).unwrap_or(false);
        if top_level && !shadow {
            root_ids.push(id.clone());
        }
    }
    root_ids.sort_by(|a, b| block_sort_key(blocks, a).cmp(&block_sort_key(blocks, b)));

    let loader = BlockLoader { blocks, comments };
    for id in root_ids {
        let mut visited = HashSet::new();
        project.roots.push(loader.build_block(&id, &mut visited)?);
    }
    Ok(())
}

fn read_variable_decls(node: Option<&Value>) -> Vec<String> {
    let mut out = Vec::new();
    let Some(obj) = node.and_then(Value::as_object) else {
        return out;
    };
    for value in obj.values() {
        if let Some(name) = value
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(Value::as_str)
        {
            out.push(name.to_string());
        }
    }
    out
}

fn read_comment_map(node: Option<&Value>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(obj) = node.and_then(Value::as_object) else {
        return out;
    };
    for comment in obj.values() {
        let Some(block_id) = comment.get("blockId").and_then(Value::as_str) else {
            continue;
        };
        if let Some(text) = comment.get("text").and_then(Value::as_str) {
            out.insert(block_id.to_string(), text.to_string());
        }
    }
    out
}

fn block_sort_key(blocks: &Map<String, Value>, id: &str) -> (i64, i64, String) {
    let block = blocks.get(id);
    // Coordinates may arrive as floats; rank order is all that matters.
    let y = block
        .and_then(|b| b.get("y"))
        .and_then(Value::as_f64)
        .map(|f| f as i64)
        .unwrap_or(i64::MAX);
    let x = block
        .and_then(|b| b.get("x"))
        .and_then(Value::as_f64)
        .map(|f| f as i64)
        .unwrap_or(i64::MAX);
    (y, x, id.to_string())
}

struct BlockLoader<'a> {
    blocks: &'a Map<String, Value>,
    comments: HashMap<String, String>,
}

impl<'a> BlockLoader<'a> {
    fn build_block(&self, id: &str, visited: &mut HashSet<String>) -> Result<Block> {
        if !visited.insert(id.to_string()) {
            bail!("Cyclic block chain at '{}'.", id);
        }
        let raw = self
            .blocks
            .get(id)
            .ok_or_else(|| anyhow!("Missing block '{}'.", id))?;
        let kind = raw
            .get("opcode")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Block '{}' is missing an opcode.", id))?;

        let mut block = Block::new(id, kind);
        block.comment = self.comments.get(id).cloned();
        self.read_fields(raw, &mut block);
        self.read_inputs(raw, &mut block, visited)?;

        if block.kind == "procedures_definition" {
            self.normalize_procedure_definition(raw, &mut block, visited)?;
        } else if block.kind == "procedures_call" {
            normalize_procedure_call(raw, &mut block)?;
        } else if let Some(next_id) = raw.get("next").and_then(Value::as_str) {
            block.next = Some(Box::new(self.build_block(next_id, visited)?));
        }
        Ok(block)
    }

    fn read_fields(&self, raw: &Value, block: &mut Block) {
        let Some(fields) = raw.get("fields").and_then(Value::as_object) else {
            return;
        };
        for (name, value) in fields {
            // sb3 fields are [value, optional id]; plain scalars also accepted.
            let scalar = value.as_array().and_then(|arr| arr.first()).unwrap_or(value);
            let field = if let Some(n) = scalar.as_f64() {
                FieldValue::Number(n)
            } else if let Some(s) = scalar.as_str() {
                FieldValue::Text(s.to_string())
            } else {
                continue;
            };
            block.fields.insert(name.clone(), field);
        }
    }

    fn read_inputs(
        &self,
        raw: &Value,
        block: &mut Block,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        let Some(inputs) = raw.get("inputs").and_then(Value::as_object) else {
            return Ok(());
        };
        for (name, input_val) in inputs {
            if block.kind == "procedures_definition" && name == "custom_block" {
                continue;
            }
            let Some(child) = self.resolve_input(input_val, visited)? else {
                continue;
            };
            if is_statement_input(name) {
                block.statements.insert(name.clone(), child);
            } else {
                block.values.insert(name.clone(), child);
            }
        }
        Ok(())
    }

    fn resolve_input(
        &self,
        input_val: &Value,
        visited: &mut HashSet<String>,
    ) -> Result<Option<Block>> {
        if let Some(block_id) = input_val.as_str() {
            return Ok(Some(self.build_block(block_id, visited)?));
        }
        let Some(arr) = input_val.as_array() else {
            return Ok(None);
        };
        if arr.len() < 2 {
            return Ok(None);
        }
        // [mode, payload, optional shadow]; modes 1-3 all carry either a
        // block id or an inline literal in the payload slot.
        let payload = &arr[1];
        if let Some(block_id) = payload.as_str() {
            return Ok(Some(self.build_block(block_id, visited)?));
        }
        if let Some(lit) = payload.as_array() {
            return Ok(literal_to_block(lit));
        }
        Ok(None)
    }

    fn normalize_procedure_definition(
        &self,
        raw: &Value,
        block: &mut Block,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        let prototype_id = raw
            .get("inputs")
            .and_then(Value::as_object)
            .and_then(|m| m.get("custom_block"))
            .and_then(input_block_id)
            .ok_or_else(|| {
                anyhow!("Procedure definition '{}' is missing its prototype.", block.id)
            })?;
        let prototype = self
            .blocks
            .get(&prototype_id)
            .ok_or_else(|| anyhow!("Missing block '{}'.", prototype_id))?;
        let mutation = prototype
            .get("mutation")
            .and_then(Value::as_object)
            .ok_or_else(|| anyhow!("Procedure prototype '{}' has no mutation.", prototype_id))?;
        let proccode = mutation
            .get("proccode")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Procedure prototype '{}' has no proccode.", prototype_id))?;
        let params = mutation
            .get("argumentnames")
            .and_then(Value::as_str)
            .and_then(|names| serde_json::from_str::<Vec<String>>(names).ok())
            .unwrap_or_default();
        let warp = mutation
            .get("warp")
            .and_then(Value::as_str)
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        block.mutation = Some(Mutation {
            name: proccode_name(proccode),
            params,
            warp,
        });

        // The definition's next chain is the procedure body.
        if let Some(body_id) = raw.get("next").and_then(Value::as_str) {
            let body = self.build_block(body_id, visited)?;
            block.statements.insert("STACK".to_string(), body);
        }
        Ok(())
    }
}

fn normalize_procedure_call(raw: &Value, block: &mut Block) -> Result<()> {
    let mutation = raw
        .get("mutation")
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("Procedure call '{}' has no mutation.", block.id))?;
    let proccode = mutation
        .get("proccode")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Procedure call '{}' has no proccode.", block.id))?;
    let arg_ids = mutation
        .get("argumentids")
        .and_then(Value::as_str)
        .and_then(|ids| serde_json::from_str::<Vec<String>>(ids).ok())
        .unwrap_or_default();

    // Re-key the argument inputs into positional ARG0..ARGn slots.
    let mut positional = std::collections::BTreeMap::new();
    for (index, arg_id) in arg_ids.iter().enumerate() {
        if let Some(child) = block.values.remove(arg_id) {
            positional.insert(format!("ARG{}", index), child);
        }
    }
    block.values = positional;
    block.mutation = Some(Mutation {
        name: proccode_name(proccode),
        params: arg_ids.iter().map(|_| String::new()).collect(),
        warp: false,
    });
    Ok(())
}

fn input_block_id(input_val: &Value) -> Option<String> {
    if let Some(id) = input_val.as_str() {
        return Some(id.to_string());
    }
    let arr = input_val.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    arr[1].as_str().map(str::to_string)
}

fn literal_to_block(lit: &[Value]) -> Option<Block> {
    if lit.len() < 2 {
        return None;
    }
    let code = lit[0].as_i64().unwrap_or_default();
    match code {
        // Variable reference literal: [12, name, id].
        12 => {
            let name = lit[1].as_str()?;
            let mut block = Block::new("", "variables_get");
            block
                .fields
                .insert("VAR".to_string(), FieldValue::Text(name.to_string()));
            Some(block)
        }
        // Numeric literal codes (number, positive number, whole number,
        // integer, angle).
        4..=8 => {
            let text = literal_text(&lit[1]);
            let mut block = Block::new("", "math_number");
            let field = match text.trim().parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                Err(_) => FieldValue::Text(text),
            };
            block.fields.insert("NUM".to_string(), field);
            Some(block)
        }
        _ => {
            let mut block = Block::new("", "text");
            block
                .fields
                .insert("TEXT".to_string(), FieldValue::Text(literal_text(&lit[1])));
            Some(block)
        }
    }
}

fn literal_text(value: &Value) -> String {
    if let Some(s) = value.as_str() {
        s.to_string()
    } else if let Some(n) = value.as_f64() {
        format!("{}", n)
    } else {
        String::new()
    }
}

fn is_statement_input(name: &str) -> bool {
    name == "ELSE"
        || name.starts_with("SUBSTACK")
        || name.starts_with("STACK")
        || (name.starts_with("DO") && name[2..].chars().all(|c| c.is_ascii_digit()))
}

fn proccode_name(proccode: &str) -> String {
    let mut parts = Vec::new();
    for token in proccode.split_whitespace() {
        if token == "%s" || token == "%n" || token == "%b" {
            break;
        }
        parts.push(token);
    }
    if parts.is_empty() {
        proccode.to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_chain_with_inline_literals() {
        let source = r#"{
            "variables": {"v1": ["speed", 0]},
            "blocks": {
                "a": {"opcode": "event_when_wobot_started", "topLevel": true, "next": "b", "x": 0, "y": 0},
                "b": {"opcode": "variables_set",
                      "fields": {"VAR": ["speed", "v1"]},
                      "inputs": {"VALUE": [1, [4, "5"]]}}
            }
        }"#;
        let project = parse_project_source(source).unwrap();
        assert_eq!(project.variables, vec!["speed".to_string()]);
        assert_eq!(project.roots.len(), 1);
        let hat = &project.roots[0];
        assert_eq!(hat.kind, "event_when_wobot_started");
        let set = hat.next.as_deref().unwrap();
        assert_eq!(set.kind, "variables_set");
        assert_eq!(set.field_text("VAR").as_deref(), Some("speed"));
        let value = set.value_input("VALUE").unwrap();
        assert_eq!(value.kind, "math_number");
        assert_eq!(value.field("NUM").unwrap().as_number(), Some(5.0));
    }

    #[test]
    fn substack_inputs_become_statement_slots() {
        let source = r#"{
            "blocks": {
                "a": {"opcode": "event_when_wobot_started", "topLevel": true, "next": "b"},
                "b": {"opcode": "control_if",
                      "inputs": {"CONDITION": [2, "c"], "SUBSTACK": [2, "d"]}},
                "c": {"opcode": "logic_boolean", "fields": {"BOOL": ["TRUE", null]}},
                "d": {"opcode": "looks_show_noop"}
            }
        }"#;
        let project = parse_project_source(source).unwrap();
        let cond = project.roots[0].next.as_deref().unwrap();
        assert!(cond.value_input("CONDITION").is_some());
        assert!(cond.statement_input("SUBSTACK").is_some());
    }

    #[test]
    fn missing_block_reference_is_fatal() {
        let source = r#"{
            "blocks": {
                "a": {"opcode": "event_when_wobot_started", "topLevel": true, "next": "ghost"}
            }
        }"#;
        let err = parse_project_source(source).unwrap_err();
        assert!(format!("{:#}", err).contains("Missing block 'ghost'"));
    }

    #[test]
    fn cyclic_chain_is_rejected() {
        let source = r#"{
            "blocks": {
                "a": {"opcode": "event_when_wobot_started", "topLevel": true, "next": "b"},
                "b": {"opcode": "looks_show_noop", "next": "b"}
            }
        }"#;
        let err = parse_project_source(source).unwrap_err();
        assert!(format!("{:#}", err).contains("Cyclic block chain"));
    }

    #[test]
    fn procedure_definition_is_normalized() {
        let source = r#"{
            "blocks": {
                "def": {"opcode": "procedures_definition", "topLevel": true,
                        "inputs": {"custom_block": [1, "proto"]}, "next": "body"},
                "proto": {"opcode": "procedures_prototype", "shadow": true,
                          "mutation": {"proccode": "blink %s %s",
                                       "argumentnames": "[\"times\",\"delay\"]",
                                       "warp": "true"}},
                "body": {"opcode": "looks_show_noop"}
            }
        }"#;
        let project = parse_project_source(source).unwrap();
        let def = &project.roots[0];
        let mutation = def.mutation.as_ref().unwrap();
        assert_eq!(mutation.name, "blink");
        assert_eq!(mutation.params, vec!["times".to_string(), "delay".to_string()]);
        assert!(mutation.warp);
        assert!(def.next.is_none());
        assert!(def.statement_input("STACK").is_some());
    }
}
