use super::{format_number, is_simple_operand, Block, Generator, Order};
use crate::names::NameKind;
use anyhow::{bail, Result};

pub fn repeat(gen: &mut Generator, block: &Block) -> Result<String> {
    // controls_repeat carries the count as a field; controls_repeat_ext as
    // a value input.
    let repeats = match block.field("TIMES") {
        Some(field) => format_number(field.as_number().unwrap_or(0.0)),
        None => gen.value_or(block, "TIMES", Order::Assignment, "0")?,
    };
    let branch = gen.statement_to_code(block, "DO")?;
    let branch = gen.add_loop_trap(branch, block);

    let mut code = String::new();
    let loop_var = gen.names_mut().get_distinct_name("count", NameKind::Variable);
    let end_var = if is_simple_operand(&repeats) {
        repeats
    } else {
        // Evaluate a computed count once, before the loop.
        let end_var = gen
            .names_mut()
            .get_distinct_name("repeat_end", NameKind::Variable);
        code.push_str(&format!("float {} = {};\n", end_var, repeats));
        end_var
    };
    code.push_str(&format!(
        "for (float {} = 0; {} < {}; {}++) {{\n{}}}\n",
        loop_var, loop_var, end_var, loop_var, branch
    ));
    Ok(code)
}

pub fn while_until(gen: &mut Generator, block: &Block) -> Result<String> {
    let until = block.field_text("MODE").as_deref() == Some("UNTIL");
    let order = if until {
        Order::LogicalNot
    } else {
        Order::None
    };
    let mut condition = gen.value_or(block, "BOOL", order, "false")?;
    let branch = gen.statement_to_code(block, "DO")?;
    let branch = gen.add_loop_trap(branch, block);
    if until {
        condition = format!("!{}", condition);
    }
    Ok(format!("while ({}) {{\n{}}}\n", condition, branch))
}

pub fn for_loop(gen: &mut Generator, block: &Block) -> Result<String> {
    let variable = gen.variable_name(block, "VAR")?;
    let from = gen.value_or(block, "FROM", Order::Assignment, "0")?;
    let to = gen.value_or(block, "TO", Order::Assignment, "0")?;
    let by = gen.value_or(block, "BY", Order::Assignment, "1")?;
    let branch = gen.statement_to_code(block, "DO")?;
    let branch = gen.add_loop_trap(branch, block);

    if let (Ok(from_num), Ok(to_num), Ok(by_num)) = (
        from.parse::<f64>(),
        to.parse::<f64>(),
        by.parse::<f64>(),
    ) {
        // All bounds are literals: emit the plain increasing or decreasing
        // loop directly.
        let up = from_num <= to_num;
        let compare = if up { "<=" } else { ">=" };
        let step = by_num.abs();
        let update = if step == 1.0 {
            format!("{}{}", variable, if up { "++" } else { "--" })
        } else {
            format!(
                "{} {}= {}",
                variable,
                if up { "+" } else { "-" },
                format_number(step)
            )
        };
        return Ok(format!(
            "for ({} = {}; {} {} {}; {}) {{\n{}}}\n",
            variable, from, variable, compare, to, update, branch
        ));
    }

    // Dynamic bounds: cache the endpoints, then flip the step to match
    // their direction at runtime.
    let mut code = String::new();
    let start_var = if is_simple_operand(&from) {
        from
    } else {
        let name = gen
            .names_mut()
            .get_distinct_name(&format!("{}_start", variable), NameKind::Variable);
        code.push_str(&format!("float {} = {};\n", name, from));
        name
    };
    let end_var = if is_simple_operand(&to) {
        to
    } else {
        let name = gen
            .names_mut()
            .get_distinct_name(&format!("{}_end", variable), NameKind::Variable);
        code.push_str(&format!("float {} = {};\n", name, to));
        name
    };
    let inc_var = gen
        .names_mut()
        .get_distinct_name(&format!("{}_inc", variable), NameKind::Variable);
    let step = match by.parse::<f64>() {
        Ok(n) => format_number(n.abs()),
        Err(_) => format!("fabs({})", by),
    };
    code.push_str(&format!("float {} = {};\n", inc_var, step));
    code.push_str(&format!(
        "if ({} > {}) {{\n  {} = -{};\n}}\n",
        start_var, end_var, inc_var, inc_var
    ));
    code.push_str(&format!(
        "for ({} = {}; {} >= 0 ? {} <= {} : {} >= {}; {} += {}) {{\n{}}}\n",
        variable, start_var, inc_var, variable, end_var, variable, end_var, variable, inc_var,
        branch
    ));
    Ok(code)
}

pub fn flow_statements(gen: &mut Generator, block: &Block) -> Result<String> {
    let mut xfix = String::new();
    if let Some(prefix) = gen.config().statement_prefix.clone() {
        xfix.push_str(&gen.inject_id(&prefix, block));
    }
    if let Some(suffix) = gen.config().statement_suffix.clone() {
        xfix.push_str(&gen.inject_id(&suffix, block));
    }
    match block.field_text("FLOW").as_deref() {
        Some("BREAK") => Ok(format!("{}break;\n", xfix)),
        Some("CONTINUE") => Ok(format!("{}continue;\n", xfix)),
        other => bail!("Unknown flow statement '{}'.", other.unwrap_or("")),
    }
}
