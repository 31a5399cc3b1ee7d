use super::{Block, Generator, Order};
use anyhow::Result;

fn field_or(block: &Block, name: &str, default: &str) -> String {
    block
        .field_text(name)
        .unwrap_or_else(|| default.to_string())
}

pub fn set_encoder_motor(gen: &mut Generator, block: &Block) -> Result<String> {
    let motor = field_or(block, "MOTOR_ID", "1");
    let port = field_or(block, "PORT", "1");
    let power = gen.value_or(block, "POWER", Order::None, "0")?;
    Ok(format!(
        "set_encoder_motor({}, {}, {});\n",
        motor, port, power
    ))
}

pub fn set_dc_motor(gen: &mut Generator, block: &Block) -> Result<String> {
    let motor = field_or(block, "MOTOR_ID", "1");
    let port = field_or(block, "PORT", "1");
    let power = gen.value_or(block, "POWER", Order::None, "0")?;
    Ok(format!("set_dc_motor({}, {}, {});\n", motor, port, power))
}

pub fn smart_servo_angle(gen: &mut Generator, block: &Block) -> Result<String> {
    let servo = gen.value_or(block, "SERVO_ID", Order::Comma, "1")?;
    let speed = gen.value_or(block, "SPEED", Order::Comma, "0")?;
    let angle = gen.value_or(block, "ANGLE", Order::Comma, "0")?;
    Ok(format!(
        "set_smart_servo_angle({}, {}, {});\n",
        servo, speed, angle
    ))
}

pub fn smart_servo(gen: &mut Generator, block: &Block) -> Result<String> {
    let servo = gen.value_or(block, "SERVO_ID", Order::Comma, "1")?;
    let speed = gen.value_or(block, "SPEED", Order::Comma, "0")?;
    Ok(format!("set_smart_servo({}, {});\n", servo, speed))
}

pub fn servo(gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "SERVO_PORT", "1");
    let speed = gen.value_or(block, "SPEED", Order::Comma, "0")?;
    let angle = gen.value_or(block, "ANGLE", Order::Comma, "0")?;
    Ok(format!("set_servo({}, {}, {});\n", port, speed, angle))
}

pub fn step_motor(gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let power = gen.value_or(block, "POWER", Order::Comma, "0")?;
    let steps = gen.value_or(block, "STEPS", Order::Comma, "0")?;
    // The stepper needs its service call pumped from the loop handler.
    gen.register_builtin_loop_call(format!("step_motor_loop({});", port));
    Ok(format!(
        "set_step_motor({}, {}, {});\n",
        port, power, steps
    ))
}

pub fn set_electromagnet(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let status = field_or(block, "STATUS", "0");
    Ok(format!("set_electromagnet({}, {});\n", port, status))
}

pub fn set_digital_output(_gen: &mut Generator, block: &Block) -> Result<String> {
    let port = field_or(block, "PORT", "1");
    let status = field_or(block, "STATUS", "0");
    Ok(format!("set_digital_output({}, {});\n", port, status))
}
