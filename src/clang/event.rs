use super::{Block, Generator};
use anyhow::Result;

// Hat blocks produce no code of their own; the assembler decides where
// their chains land.
pub fn when_started(_gen: &mut Generator, _block: &Block) -> Result<String> {
    Ok(String::new())
}

pub fn when_loop(_gen: &mut Generator, _block: &Block) -> Result<String> {
    Ok(String::new())
}
