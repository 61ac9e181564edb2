use super::{ActionError, DictSemantics, Value};

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), ActionError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ActionError::new(format!(
            "{name}() takes {expected} argument(s) ({} given)",
            args.len()
        )))
    }
}

fn unsupported(name: &str, args: &[Value]) -> ActionError {
    let types: Vec<_> = args.iter().map(Value::type_name).collect();
    ActionError::new(format!(
        "unsupported operand type(s) for {name}: {}",
        types.join(", ")
    ))
}

fn overflow(name: &str) -> ActionError {
    ActionError::new(format!("integer overflow in {name}"))
}

fn binary(args: Vec<Value>, name: &str) -> Result<(Value, Value), ActionError> {
    arity(name, &args, 2)?;
    let mut it = args.into_iter();
    match (it.next(), it.next()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ActionError::new(format!("{name}() takes 2 arguments"))),
    }
}

fn unary(args: Vec<Value>, name: &str) -> Result<Value, ActionError> {
    arity(name, &args, 1)?;
    args.into_iter()
        .next()
        .ok_or_else(|| ActionError::new(format!("{name}() takes 1 argument")))
}

/// Applies `int_op` when both sides are ints, else `float_op` with promotion.
fn arith(
    name: &str,
    a: &Value,
    b: &Value,
    int_op: impl Fn(i64, i64) -> Result<Value, ActionError>,
    float_op: impl Fn(f64, f64) -> Result<Value, ActionError>,
) -> Result<Value, ActionError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_op(*x, *y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => float_op(x, y),
            _ => Err(unsupported(name, &[a.clone(), b.clone()])),
        },
    }
}

fn zero_division(name: &str) -> ActionError {
    ActionError::new(format!("division by zero in {name}"))
}

fn floor_div_int(x: i64, y: i64) -> Option<i64> {
    let q = x.checked_div(y)?;
    if (x % y != 0) && ((x < 0) != (y < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn modulo_int(x: i64, y: i64) -> Option<i64> {
    let r = x.checked_rem(y)?;
    if r != 0 && ((r < 0) != (y < 0)) {
        r.checked_add(y)
    } else {
        Some(r)
    }
}

fn modulo_float(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
        r + y
    } else {
        r
    }
}

fn add(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "add")?;
    match (&a, &b) {
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
        (Value::Tuple(x), Value::Tuple(y)) => {
            Ok(Value::Tuple(x.iter().chain(y).cloned().collect()))
        }
        _ => arith(
            "add",
            &a,
            &b,
            |x, y| x.checked_add(y).map(Value::Int).ok_or_else(|| overflow("add")),
            |x, y| Ok(Value::Float(x + y)),
        ),
    }
}

fn sub(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "sub")?;
    arith(
        "sub",
        &a,
        &b,
        |x, y| x.checked_sub(y).map(Value::Int).ok_or_else(|| overflow("sub")),
        |x, y| Ok(Value::Float(x - y)),
    )
}

fn mul(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "mul")?;
    arith(
        "mul",
        &a,
        &b,
        |x, y| x.checked_mul(y).map(Value::Int).ok_or_else(|| overflow("mul")),
        |x, y| Ok(Value::Float(x * y)),
    )
}

fn truediv(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "truediv")?;
    match (a.as_f64(), b.as_f64()) {
        (Some(_), Some(y)) if y == 0.0 => Err(zero_division("truediv")),
        (Some(x), Some(y)) => Ok(Value::Float(x / y)),
        _ => Err(unsupported("truediv", &[a, b])),
    }
}

/// Classic division: floor division for two ints, true division as soon as
/// either operand is a float.
fn div(args: Vec<Value>) -> Result<Value, ActionError> {
    if matches!(args.as_slice(), [Value::Int(_), Value::Int(_)]) {
        floordiv(args)
    } else {
        truediv(args)
    }
}

fn floordiv(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "floordiv")?;
    arith(
        "floordiv",
        &a,
        &b,
        |x, y| {
            if y == 0 {
                return Err(zero_division("floordiv"));
            }
            floor_div_int(x, y)
                .map(Value::Int)
                .ok_or_else(|| overflow("floordiv"))
        },
        |x, y| {
            if y == 0.0 {
                Err(zero_division("floordiv"))
            } else {
                Ok(Value::Float((x / y).floor()))
            }
        },
    )
}

fn modulo(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "mod")?;
    arith(
        "mod",
        &a,
        &b,
        |x, y| {
            if y == 0 {
                return Err(zero_division("mod"));
            }
            modulo_int(x, y).map(Value::Int).ok_or_else(|| overflow("mod"))
        },
        |x, y| {
            if y == 0.0 {
                Err(zero_division("mod"))
            } else {
                Ok(Value::Float(modulo_float(x, y)))
            }
        },
    )
}

fn pow(args: Vec<Value>) -> Result<Value, ActionError> {
    let (a, b) = binary(args, "pow")?;
    arith(
        "pow",
        &a,
        &b,
        |x, y| match u32::try_from(y) {
            Ok(exp) => x.checked_pow(exp).map(Value::Int).ok_or_else(|| overflow("pow")),
            Err(_) if y < 0 && x == 0 => Err(zero_division("pow")),
            #[allow(clippy::cast_precision_loss)]
            Err(_) if y < 0 => Ok(Value::Float((x as f64).powf(y as f64))),
            Err(_) => Err(overflow("pow")),
        },
        |x, y| Ok(Value::Float(x.powf(y))),
    )
}

fn neg(args: Vec<Value>) -> Result<Value, ActionError> {
    match unary(args, "neg")? {
        Value::Int(x) => x.checked_neg().map(Value::Int).ok_or_else(|| overflow("neg")),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(unsupported("neg", &[other])),
    }
}

fn pos(args: Vec<Value>) -> Result<Value, ActionError> {
    match unary(args, "pos")? {
        v @ (Value::Int(_) | Value::Float(_)) => Ok(v),
        other => Err(unsupported("pos", &[other])),
    }
}

fn int(args: Vec<Value>) -> Result<Value, ActionError> {
    match unary(args, "int")? {
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ActionError::new(format!("invalid literal for int(): {}", Value::Str(s)))),
        Value::Int(n) => Ok(Value::Int(n)),
        #[allow(clippy::cast_possible_truncation)]
        Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        other => Err(unsupported("int", &[other])),
    }
}

fn float(args: Vec<Value>) -> Result<Value, ActionError> {
    match unary(args, "float")? {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ActionError::new(format!("could not convert string to float: {}", Value::Str(s)))),
        other => other
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| unsupported("float", &[other])),
    }
}

fn str_(args: Vec<Value>) -> Result<Value, ActionError> {
    match unary(args, "str")? {
        Value::Str(s) => Ok(Value::Str(s)),
        other => Ok(Value::Str(other.to_string())),
    }
}

fn join(args: Vec<Value>) -> Result<Value, ActionError> {
    let mut out = String::new();
    for arg in args {
        match arg {
            Value::Str(s) => out.push_str(&s),
            other => return Err(unsupported("join", &[other])),
        }
    }
    Ok(Value::Str(out))
}

/// Conversions and structural helpers: `int`, `float`, `str`, `hug`
/// (collect the frame into one tuple), `list` (alias of `hug`), `join`
/// (concatenate strings) and `nil`.
#[must_use]
pub fn base_semantics() -> DictSemantics {
    DictSemantics::new()
        .with("int", int)
        .with("float", float)
        .with("str", str_)
        .with("hug", |args| Ok(Value::Tuple(args)))
        .with("list", |args| Ok(Value::Tuple(args)))
        .with("join", join)
        .with("nil", |_| Ok(Value::Nil))
}

/// Arithmetic actions with int/float promotion, floor division and
/// sign-of-divisor modulo. `div` is classic division: it floors two ints and
/// divides exactly when either operand is a float.
#[must_use]
pub fn operator_semantics() -> DictSemantics {
    DictSemantics::new()
        .with("add", add)
        .with("sub", sub)
        .with("mul", mul)
        .with("truediv", truediv)
        .with("floordiv", floordiv)
        .with("div", div)
        .with("mod", modulo)
        .with("pow", pow)
        .with("neg", neg)
        .with("pos", pos)
}
