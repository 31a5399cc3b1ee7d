use super::{prefix_lines, Block, Generator, Order, INDENT};
use crate::names::NameKind;
use anyhow::{anyhow, Result};

pub fn definition(gen: &mut Generator, block: &Block) -> Result<String> {
    let mutation = block
        .mutation
        .as_ref()
        .ok_or_else(|| anyhow!("Procedure definition '{}' has no signature.", block.id))?
        .clone();
    let func_name = gen.names_mut().get_name(&mutation.name, NameKind::Procedure);
    // Allocating the parameters up front keeps the body's argument
    // reporters on the same spellings.
    let params: Vec<String> = mutation
        .params
        .iter()
        .map(|p| gen.names_mut().get_name(p, NameKind::Parameter))
        .collect();

    let branch = gen.statement_to_code(block, "STACK")?;
    let branch = gen.add_loop_trap(branch, block);

    let args = params
        .iter()
        .map(|p| format!("float {}", p))
        .collect::<Vec<_>>()
        .join(", ");
    let code = format!("void {}({}) {{\n{}}}", func_name, args, branch);

    // Definitions are hoisted above _setup; the chain itself emits nothing.
    gen.register_definition(format!("%{}", func_name), code);
    Ok(String::new())
}

pub fn call(gen: &mut Generator, block: &Block) -> Result<String> {
    let mutation = block
        .mutation
        .as_ref()
        .ok_or_else(|| anyhow!("Procedure call '{}' has no signature.", block.id))?
        .clone();
    let func_name = gen.names_mut().get_name(&mutation.name, NameKind::Procedure);
    let mut args = Vec::with_capacity(mutation.params.len());
    for index in 0..mutation.params.len() {
        args.push(gen.value_or(block, &format!("ARG{}", index), Order::Comma, "0")?);
    }
    Ok(format!("{}({});\n", func_name, args.join(", ")))
}

pub fn if_return(gen: &mut Generator, block: &Block) -> Result<String> {
    let condition = gen.value_or(block, "CONDITION", Order::None, "false")?;
    let mut code = format!("if ({}) {{\n", condition);
    if let Some(suffix) = gen.config().statement_suffix.clone() {
        // The trailing suffix never runs once the return fires, so it goes
        // inside the guard.
        code.push_str(&prefix_lines(&gen.inject_id(&suffix, block), INDENT));
    }
    code.push_str(INDENT);
    code.push_str("return;\n}\n");
    Ok(code)
}

pub fn argument_reporter(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let name = block
        .field_text("VALUE")
        .ok_or_else(|| anyhow!("Argument reporter '{}' has no name.", block.id))?;
    Ok((
        gen.names_mut().get_name(&name, NameKind::Parameter),
        Order::Atomic,
    ))
}
