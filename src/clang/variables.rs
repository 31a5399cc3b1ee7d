use super::{Block, Generator, Order};
use anyhow::Result;

pub fn get(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let name = gen.variable_name(block, "VAR")?;
    Ok((name, Order::Atomic))
}

pub fn set(gen: &mut Generator, block: &Block) -> Result<String> {
    let value = gen.value_or(block, "VALUE", Order::Assignment, "0")?;
    let variable = gen.variable_name(block, "VAR")?;
    Ok(format!("{} = {};\n", variable, value))
}
