use super::{prefix_lines, Block, Generator, Order, INDENT};
use anyhow::{bail, Result};

pub fn control_if(gen: &mut Generator, block: &Block) -> Result<String> {
    let condition = gen.value_or(block, "CONDITION", Order::None, "false")?;
    let mut code = String::new();
    if let Some(prefix) = gen.config().statement_prefix.clone() {
        code.push_str(&gen.inject_id(&prefix, block));
    }
    let mut branch = gen.statement_to_code(block, "SUBSTACK")?;
    if let Some(suffix) = gen.config().statement_suffix.clone() {
        branch = format!(
            "{}{}",
            prefix_lines(&gen.inject_id(&suffix, block), INDENT),
            branch
        );
    }
    code.push_str(&format!("if ({}) {{\n{}}}\n", condition, branch));
    Ok(code)
}

pub fn control_if_else(gen: &mut Generator, block: &Block) -> Result<String> {
    let condition = gen.value_or(block, "CONDITION", Order::None, "false")?;
    let mut code = String::new();
    if let Some(prefix) = gen.config().statement_prefix.clone() {
        code.push_str(&gen.inject_id(&prefix, block));
    }
    let suffix = gen
        .config()
        .statement_suffix
        .clone()
        .map(|s| prefix_lines(&gen.inject_id(&s, block), INDENT));
    let mut branch = gen.statement_to_code(block, "SUBSTACK")?;
    let mut else_branch = gen.statement_to_code(block, "SUBSTACK2")?;
    if let Some(suffix) = suffix {
        branch = format!("{}{}", suffix, branch);
        else_branch = format!("{}{}", suffix, else_branch);
    }
    code.push_str(&format!(
        "if ({}) {{\n{}}}\nelse{{\n{}}}\n",
        condition, branch, else_branch
    ));
    Ok(code)
}

// Legacy elseif-chain shape: IF0/DO0, IF1/DO1, ... plus an optional ELSE.
pub fn controls_if(gen: &mut Generator, block: &Block) -> Result<String> {
    let mut code = String::new();
    if let Some(prefix) = gen.config().statement_prefix.clone() {
        code.push_str(&gen.inject_id(&prefix, block));
    }
    let suffix = gen
        .config()
        .statement_suffix
        .clone()
        .map(|s| prefix_lines(&gen.inject_id(&s, block), INDENT));
    let mut n = 0;
    loop {
        let condition = gen.value_or(block, &format!("IF{}", n), Order::None, "false")?;
        let mut branch = gen.statement_to_code(block, &format!("DO{}", n))?;
        if let Some(suffix) = &suffix {
            branch = format!("{}{}", suffix, branch);
        }
        let keyword = if n == 0 { "if" } else { " else if" };
        code.push_str(&format!("{} ({}) {{\n{}}}", keyword, condition, branch));
        n += 1;
        let has_more = block.values.contains_key(&format!("IF{}", n))
            || block.statements.contains_key(&format!("DO{}", n));
        if !has_more {
            break;
        }
    }
    if block.statements.contains_key("ELSE") {
        let mut branch = gen.statement_to_code(block, "ELSE")?;
        if let Some(suffix) = &suffix {
            branch = format!("{}{}", suffix, branch);
        }
        code.push_str(&format!(" else {{\n{}}}", branch));
    }
    code.push('\n');
    Ok(code)
}

pub fn compare(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let op = block.field_text("OP").unwrap_or_default();
    let (symbol, order) = match op.as_str() {
        "EQ" => ("==", Order::Equality),
        "NEQ" => ("!=", Order::Equality),
        "LT" => ("<", Order::Relational),
        "LTE" => ("<=", Order::Relational),
        "GT" => (">", Order::Relational),
        "GTE" => (">=", Order::Relational),
        other => bail!("Unknown comparison operator '{}'.", other),
    };
    let a = gen.value_or(block, "A", order, "0")?;
    let b = gen.value_or(block, "B", order, "0")?;
    Ok((format!("{} {} {}", a, symbol, b), order))
}

pub fn operation(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let op = block.field_text("OP").unwrap_or_default();
    let (symbol, order) = match op.as_str() {
        "AND" => ("&&", Order::LogicalAnd),
        "OR" => ("||", Order::LogicalOr),
        other => bail!("Unknown logical operator '{}'.", other),
    };
    let a = gen.value_to_code(block, "A", order)?;
    let b = gen.value_to_code(block, "B", order)?;
    let (a, b) = match (a, b) {
        (None, None) => ("false".to_string(), "false".to_string()),
        (a, b) => {
            // A lone missing operand must not short-circuit the other one.
            let neutral = if op == "AND" { "true" } else { "false" };
            (
                a.unwrap_or_else(|| neutral.to_string()),
                b.unwrap_or_else(|| neutral.to_string()),
            )
        }
    };
    Ok((format!("{} {} {}", a, symbol, b), order))
}

pub fn negate(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let arg = gen.value_or(block, "BOOL", Order::LogicalNot, "true")?;
    Ok((format!("!{}", arg), Order::LogicalNot))
}

pub fn boolean(block: &Block) -> Result<(String, Order)> {
    let value = block.field_text("BOOL").unwrap_or_default();
    let code = if value == "TRUE" { "true" } else { "false" };
    Ok((code.to_string(), Order::Atomic))
}

pub fn ternary(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let condition = gen.value_or(block, "IF", Order::Conditional, "false")?;
    let then_value = gen.value_or(block, "THEN", Order::Conditional, "0")?;
    let else_value = gen.value_or(block, "ELSE", Order::Conditional, "0")?;
    Ok((
        format!("{} ? {} : {}", condition, then_value, else_value),
        Order::Conditional,
    ))
}
