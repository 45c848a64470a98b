// Parsing of column type strings and option clauses
use crate::types::{ColumnModifier, ColumnType, DefaultValue};
use sqlparser::ast::{Expr, UnaryOperator, Value};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Parse a declared type such as `varchar(100)` or `integer`.
///
/// Base names that are well-formed but unknown come back as
/// [`ColumnType::Unrecognized`]; only syntax problems are errors.
pub fn parse_column_type(declared: &str) -> Result<ColumnType, String> {
    let declared = declared.trim();
    if declared.is_empty() {
        return Err("type is empty".to_string());
    }

    let (base, params) = match declared.find('(') {
        Some(open) => {
            let rest = &declared[open + 1..];
            let close = rest
                .find(')')
                .ok_or_else(|| "missing closing parenthesis".to_string())?;
            if !rest[close + 1..].trim().is_empty() {
                return Err("unexpected text after size".to_string());
            }
            let params = parse_type_params(&rest[..close])?;
            (declared[..open].trim(), params)
        }
        None => {
            if declared.contains(')') {
                return Err("unbalanced parenthesis".to_string());
            }
            (declared, Vec::new())
        }
    };

    if !is_type_name(base) {
        return Err(format!("'{}' is not a type name", base));
    }

    let column_type = match base.to_ascii_lowercase().as_str() {
        "varchar" | "char" | "character" => match params.as_slice() {
            [] => ColumnType::Varchar(None),
            [len] => ColumnType::Varchar(Some(*len)),
            _ => return Err(format!("{} takes at most one size", base)),
        },
        "text" => sizeless(base, &params, ColumnType::Text)?,
        "integer" | "int" => sizeless(base, &params, ColumnType::Integer)?,
        "real" | "float" | "double" => sizeless(base, &params, ColumnType::Real)?,
        "boolean" | "bool" => sizeless(base, &params, ColumnType::Boolean)?,
        "timestamp" | "datetime" => sizeless(base, &params, ColumnType::Timestamp)?,
        _ => ColumnType::Unrecognized(declared.to_string()),
    };

    Ok(column_type)
}

fn parse_type_params(text: &str) -> Result<Vec<u32>, String> {
    text.split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<u32>() {
                Ok(0) => Err("size must be positive".to_string()),
                Ok(value) => Ok(value),
                Err(_) => Err(format!("size '{}' is not a number", part)),
            }
        })
        .collect()
}

fn sizeless(base: &str, params: &[u32], column_type: ColumnType) -> Result<ColumnType, String> {
    if params.is_empty() {
        Ok(column_type)
    } else {
        Err(format!("{} does not take a size", base))
    }
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse an options clause such as `unique` or `default current_timestamp`.
///
/// `default` consumes the rest of the clause, so it must come last.
pub fn parse_options(options: &str) -> Result<Vec<ColumnModifier>, String> {
    let mut modifiers = Vec::new();
    let mut rest = options.trim();

    while !rest.is_empty() {
        let (word, tail) = split_word(rest);
        let modifier = match word.to_ascii_lowercase().as_str() {
            "unique" => {
                rest = tail;
                ColumnModifier::Unique
            }
            "not" => {
                let (next, tail) = split_word(tail);
                if !next.eq_ignore_ascii_case("null") {
                    return Err("expected 'null' after 'not'".to_string());
                }
                rest = tail;
                ColumnModifier::NotNull
            }
            "default" => {
                if tail.is_empty() {
                    return Err("'default' needs an expression".to_string());
                }
                rest = "";
                ColumnModifier::Default(parse_default(tail)?)
            }
            _ => return Err(format!("unknown option '{}'", word)),
        };

        let repeated = modifiers.iter().any(|existing: &ColumnModifier| {
            std::mem::discriminant(existing) == std::mem::discriminant(&modifier)
        });
        if repeated {
            return Err(format!("option '{}' given more than once", word.to_ascii_lowercase()));
        }
        modifiers.push(modifier);
    }

    Ok(modifiers)
}

fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Parse and classify a default-value expression
pub fn parse_default(expr: &str) -> Result<DefaultValue, String> {
    let expr = expr.trim();
    match expr.to_ascii_uppercase().as_str() {
        "CURRENT_TIMESTAMP" => return Ok(DefaultValue::CurrentTimestamp),
        "CURRENT_DATE" => return Ok(DefaultValue::CurrentDate),
        "CURRENT_TIME" => return Ok(DefaultValue::CurrentTime),
        _ => {}
    }

    let dialect = SQLiteDialect {};
    let mut parser = Parser::new(&dialect)
        .try_with_sql(expr)
        .map_err(|e| format!("invalid default expression: {}", e))?;
    let parsed = parser
        .parse_expr()
        .map_err(|e| format!("invalid default expression: {}", e))?;
    if parser.peek_token().token != Token::EOF {
        return Err(format!("unexpected text after default expression '{}'", expr));
    }

    Ok(classify_default(parsed, expr))
}

fn classify_default(parsed: Expr, raw: &str) -> DefaultValue {
    match parsed {
        Expr::Value(Value::Null) => DefaultValue::Null,
        Expr::Value(Value::Boolean(value)) => DefaultValue::Boolean(value),
        Expr::Value(Value::Number(text, _)) => classify_number(&text),
        Expr::Value(Value::SingleQuotedString(text)) => DefaultValue::Text(text),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match *expr {
            Expr::Value(Value::Number(text, _)) => classify_number(&format!("-{}", text)),
            _ => DefaultValue::Expression(raw.to_string()),
        },
        Expr::Nested(inner) => classify_default(*inner, raw),
        _ => DefaultValue::Expression(raw.to_string()),
    }
}

fn classify_number(text: &str) -> DefaultValue {
    match text.parse::<i64>() {
        Ok(value) => DefaultValue::Integer(value),
        Err(_) => DefaultValue::Decimal(text.to_string()),
    }
}
