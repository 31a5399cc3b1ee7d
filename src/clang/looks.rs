use super::{matrix_convert, Block, Generator, Order};
use anyhow::Result;

fn field_or(block: &Block, name: &str, default: &str) -> String {
    block
        .field_text(name)
        .unwrap_or_else(|| default.to_string())
}

pub fn set_emotion(gen: &mut Generator, block: &Block) -> Result<String> {
    let emotion = gen.value_or(block, "EMOTION_ID", Order::Comma, "1")?;
    let left = field_or(block, "LEFT_PORT", "1");
    let right = field_or(block, "RIGHT_PORT", "2");
    Ok(format!("set_emotion({}, {}, {});\n", emotion, left, right))
}

pub fn off_emotion(_gen: &mut Generator, block: &Block) -> Result<String> {
    let left = field_or(block, "LEFT_PORT", "1");
    let right = field_or(block, "RIGHT_PORT", "2");
    Ok(format!("off_emotion({}, {});\n", left, right))
}

pub fn set_symbol(gen: &mut Generator, block: &Block) -> Result<String> {
    let symbol = gen.value_or(block, "SYMBOL", Order::Comma, "1")?;
    let port = field_or(block, "PORT", "1");
    Ok(format!("set_symbol({}, {});\n", symbol, port))
}

pub fn custom_led_matrix(_gen: &mut Generator, block: &Block) -> Result<String> {
    let bitmap = field_or(block, "MATRIX", "");
    let rows = matrix_convert(&bitmap);
    let port = field_or(block, "PORT", "1");
    let bytes = rows
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "set_symbol_cust((LedMatrix){{{{{}}}}}, {});\n",
        bytes, port
    ))
}

pub fn off_led_matrix(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    Ok(format!("off_led_matrix({});\n", port))
}

pub fn set_digital_tube(gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let value = gen.value_or(block, "VALUE", Order::Comma, "0")?;
    Ok(format!("set_digital_tube({}, {});\n", port, value))
}

pub fn clear_digital_tube(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    Ok(format!("clear_digital_tube({});\n", port))
}

pub fn set_led_light_rgb(gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let red = gen.value_or(block, "R", Order::Comma, "0")?;
    let green = gen.value_or(block, "G", Order::Comma, "0")?;
    let blue = gen.value_or(block, "B", Order::Comma, "0")?;
    Ok(format!(
        "set_led_light_rgb({}, {}, {}, {});\n",
        port, red, green, blue
    ))
}

pub fn set_led_light_color(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let color = field_or(block, "COLOR", "0");
    Ok(format!("set_led_light_color({}, {});\n", port, color))
}

pub fn off_led_light(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    Ok(format!("off_led_light({});\n", port))
}
