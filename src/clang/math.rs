use super::{format_number, Block, Generator, Order};
use crate::block::FieldValue;
use anyhow::{bail, Result};

pub fn number(block: &Block) -> Result<(String, Order)> {
    let value = block
        .field("NUM")
        .and_then(FieldValue::as_number)
        .unwrap_or(0.0);
    let order = if value >= 0.0 {
        Order::Atomic
    } else {
        Order::UnaryNegation
    };
    Ok((format_number(value), order))
}

pub fn arithmetic(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let op = block.field_text("OP").unwrap_or_default();
    let (symbol, order) = match op.as_str() {
        "ADD" => (" + ", Order::Addition),
        "MINUS" => (" - ", Order::Subtraction),
        "MULTIPLY" => (" * ", Order::Multiplication),
        "DIVIDE" => (" / ", Order::Division),
        "POWER" => {
            let a = gen.value_or(block, "A", Order::Comma, "0")?;
            let b = gen.value_or(block, "B", Order::Comma, "0")?;
            return Ok((format!("pow({}, {})", a, b), Order::FunctionCall));
        }
        other => bail!("Unknown arithmetic operator '{}'.", other),
    };
    let a = gen.value_or(block, "A", order, "0")?;
    let b = gen.value_or(block, "B", order, "0")?;
    Ok((format!("{}{}{}", a, symbol, b), order))
}

pub fn single(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let op = block.field_text("OP").unwrap_or_default();

    if op == "NEG" {
        let mut arg = gen.value_or(block, "NUM", Order::UnaryNegation, "0")?;
        if arg.starts_with('-') {
            // --x reads as a predecrement.
            arg = format!(" {}", arg);
        }
        return Ok((format!("-{}", arg), Order::UnaryNegation));
    }

    let arg = match op.as_str() {
        "SIN" | "COS" | "TAN" => gen.value_or(block, "NUM", Order::Division, "0")?,
        _ => gen.value_or(block, "NUM", Order::None, "0")?,
    };

    let code = match op.as_str() {
        "ABS" => format!("fabs({})", arg),
        "ROOT" => format!("sqrt({})", arg),
        "LN" => format!("log({})", arg),
        "EXP" => format!("exp({})", arg),
        "POW10" => format!("pow(10, {})", arg),
        "ROUND" => format!("round({})", arg),
        "ROUNDUP" => format!("ceil({})", arg),
        "ROUNDDOWN" => format!("floor({})", arg),
        "SIN" => format!("sin({} / 180 * M_PI)", arg),
        "COS" => format!("cos({} / 180 * M_PI)", arg),
        "TAN" => format!("tan({} / 180 * M_PI)", arg),
        _ => {
            // The inverse functions come back as an expression rather than a
            // bare call, so they carry the division rank.
            let code = match op.as_str() {
                "LOG10" => format!("log({}) / log(10)", arg),
                "ASIN" => format!("asin({}) / M_PI * 180", arg),
                "ACOS" => format!("acos({}) / M_PI * 180", arg),
                "ATAN" => format!("atan({}) / M_PI * 180", arg),
                other => bail!("Unknown math operator '{}'.", other),
            };
            return Ok((code, Order::Division));
        }
    };
    Ok((code, Order::FunctionCall))
}

pub fn constant(block: &Block) -> Result<(String, Order)> {
    let constant = block.field_text("CONSTANT").unwrap_or_default();
    let (code, order) = match constant.as_str() {
        "PI" => ("M_PI".to_string(), Order::Atomic),
        "E" => ("M_E".to_string(), Order::Atomic),
        "GOLDEN_RATIO" => ("(1 + sqrt(5)) / 2".to_string(), Order::Division),
        "SQRT2" => ("sqrt(2)".to_string(), Order::FunctionCall),
        "SQRT1_2" => ("sqrt(0.5)".to_string(), Order::FunctionCall),
        "INFINITY" => ("INFINITY".to_string(), Order::Atomic),
        other => bail!("Unknown math constant '{}'.", other),
    };
    Ok((code, order))
}

pub fn number_property(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let property = block.field_text("PROPERTY").unwrap_or_default();
    let number = gen.value_or(block, "NUMBER_TO_CHECK", Order::Modulus, "0")?;
    let code = match property.as_str() {
        "PRIME" => {
            let func = gen.provide_helper(
                "math_is_prime",
                &[
                    "int {FUNC_NAME}(float n) {",
                    "  if (n == 2 || n == 3) {",
                    "    return 1;",
                    "  }",
                    "  if (n <= 1 || fmod(n, 1) != 0 || fmod(n, 2) == 0 || fmod(n, 3) == 0) {",
                    "    return 0;",
                    "  }",
                    "  for (float x = 6; x <= sqrt(n) + 1; x += 6) {",
                    "    if (fmod(n, x - 1) == 0 || fmod(n, x + 1) == 0) {",
                    "      return 0;",
                    "    }",
                    "  }",
                    "  return 1;",
                    "}",
                ],
            );
            return Ok((format!("{}({})", func, number), Order::FunctionCall));
        }
        "EVEN" => format!("fmod({}, 2) == 0", number),
        "ODD" => format!("fmod({}, 2) == 1", number),
        "WHOLE" => format!("fmod({}, 1) == 0", number),
        "POSITIVE" => format!("{} > 0", number),
        "NEGATIVE" => format!("{} < 0", number),
        "DIVISIBLE_BY" => {
            let divisor = gen.value_or(block, "DIVISOR", Order::Comma, "0")?;
            format!("fmod({}, {}) == 0", number, divisor)
        }
        other => bail!("Unknown number property '{}'.", other),
    };
    Ok((code, Order::Equality))
}

pub fn change(gen: &mut Generator, block: &Block) -> Result<String> {
    let delta = gen.value_or(block, "DELTA", Order::Addition, "0")?;
    let variable = gen.variable_name(block, "VAR")?;
    Ok(format!("{} += {};\n", variable, delta))
}

pub fn modulo(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let dividend = gen.value_or(block, "DIVIDEND", Order::Comma, "0")?;
    let divisor = gen.value_or(block, "DIVISOR", Order::Comma, "0")?;
    Ok((
        format!("fmod({}, {})", dividend, divisor),
        Order::FunctionCall,
    ))
}

pub fn constrain(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let value = gen.value_or(block, "VALUE", Order::Comma, "0")?;
    let low = gen.value_or(block, "LOW", Order::Comma, "0")?;
    let high = gen.value_or(block, "HIGH", Order::Comma, "INFINITY")?;
    Ok((
        format!("fmin(fmax({}, {}), {})", value, low, high),
        Order::FunctionCall,
    ))
}

pub fn random_int(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let from = gen.value_or(block, "FROM", Order::Comma, "0")?;
    let to = gen.value_or(block, "TO", Order::Comma, "0")?;
    let func = gen.provide_helper(
        "math_random_int",
        &[
            "float {FUNC_NAME}(float a, float b) {",
            "  if (a > b) {",
            "    float c = a;",
            "    a = b;",
            "    b = c;",
            "  }",
            "  return floor(rand() / (RAND_MAX + 1.0) * (b - a + 1) + a);",
            "}",
        ],
    );
    Ok((format!("{}({}, {})", func, from, to), Order::FunctionCall))
}

pub fn random_float() -> Result<(String, Order)> {
    Ok(("rand() / (RAND_MAX + 1.0)".to_string(), Order::Division))
}

pub fn atan2(gen: &mut Generator, block: &Block) -> Result<(String, Order)> {
    let x = gen.value_or(block, "X", Order::Comma, "0")?;
    let y = gen.value_or(block, "Y", Order::Comma, "0")?;
    Ok((
        format!("atan2({}, {}) / M_PI * 180", y, x),
        Order::Division,
    ))
}
