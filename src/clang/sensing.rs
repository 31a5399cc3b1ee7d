use super::{Block, Order};
use anyhow::Result;

fn field_or(block: &Block, name: &str, default: &str) -> String {
    block
        .field_text(name)
        .unwrap_or_else(|| default.to_string())
}

pub fn simple_port(func: &str, block: &Block) -> Result<(String, Order)> {
    let port = field_or(block, "PORT", "1");
    Ok((format!("{}({})", func, port), Order::FunctionCall))
}

pub fn gray_detected_line(block: &Block) -> Result<(String, Order)> {
    let port = field_or(block, "PORT", "1");
    let line = field_or(block, "LINE", "0");
    Ok((
        format!("gray_detected_line({}, {})", port, line),
        Order::FunctionCall,
    ))
}

pub fn bluetooth_receiver() -> Result<(String, Order)> {
    Ok(("bluetooth_receiver()".to_string(), Order::FunctionCall))
}

pub fn jointed_arm(block: &Block) -> Result<(String, Order)> {
    let port = field_or(block, "PORT", "1");
    let axis = field_or(block, "AXIS", "0");
    Ok((
        format!("jointed_arm({}, {})", port, axis),
        Order::FunctionCall,
    ))
}

pub fn touch_button(block: &Block) -> Result<(String, Order)> {
    let port = field_or(block, "PORT", "1");
    let key = field_or(block, "KEY", "0");
    Ok((
        format!("touch_button({}, {})", port, key),
        Order::FunctionCall,
    ))
}

pub fn gyroscope(block: &Block) -> Result<(String, Order)> {
    let port = field_or(block, "PORT", "1");
    let axis = field_or(block, "AXIS", "0");
    Ok((
        format!("gyroscope({}, {})", port, axis),
        Order::FunctionCall,
    ))
}
