//! Expression parser.
//!
//! Accepts Python-style input: `**` or `^` for powers (right-associative and
//! binding tighter than unary minus, so `-x**2` is `-(x**2)`), `*` and `/`,
//! `+` and `-`, decimal literals (read as exact rationals), the constants `pi`
//! and `E`, and calls to the elementary functions listed in [`Func::from_name`]
//! plus `sqrt(a)` and the two-argument `log(a, b)`.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit0, digit1, multispace0, satisfy};
use nom::combinator::{all_consuming, cut, map, map_res, opt, recognize};
use nom::error::{context, convert_error, VerboseError, VerboseErrorKind};
use nom::multi::{fold_many0, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::{Finish, IResult};
use num_bigint::BigInt;
use num_traits::Pow;

use super::expr::{add, div, func, mul, neg, pow, sqrt, sub, Constant, Expr, Func, Rational};
use crate::utils::error::{CalcError, Result};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Deepest expression tree accepted from a request.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Parses `input` into a canonical expression.
pub fn parse(input: &str) -> Result<Expr> {
    if input.trim().is_empty() {
        return Err(CalcError::parse("expression is empty"));
    }
    check_nesting(input)?;
    match all_consuming(sum)(input).finish() {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(CalcError::parse(convert_error(input, e))),
    }
}

/// Rejects input whose tree would nest deeper than [`MAX_NESTING_DEPTH`].
///
/// Every parenthesis level counts once, and within a level each power operator
/// or unary sign chained since the last `+ - * / ,` counts once more. Binary
/// sums and products are folded flat, so long polynomials stay shallow.
pub fn check_nesting(input: &str) -> Result<()> {
    // 每一層括號的鏈長
    let mut chains: Vec<usize> = vec![0];
    let mut depth = 1;
    let mut previous: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let operand_expected = matches!(previous, None | Some('(' | ',' | '+' | '-' | '*' | '/' | '^'));
        let mut token = c;
        match c {
            '(' => {
                chains.push(0);
                depth += 1;
            }
            ')' => {
                if chains.len() > 1 {
                    depth -= 1 + chains.pop().unwrap_or(0);
                }
            }
            '^' => bump(&mut chains, &mut depth),
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                bump(&mut chains, &mut depth);
                token = '^';
            }
            '+' | '-' if operand_expected => bump(&mut chains, &mut depth),
            '+' | '-' | '*' | '/' | ',' => {
                if let Some(chain) = chains.last_mut() {
                    depth -= *chain;
                    *chain = 0;
                }
            }
            _ => {}
        }
        if depth > MAX_NESTING_DEPTH {
            return Err(CalcError::parse(format!(
                "expression is nested more than {MAX_NESTING_DEPTH} levels deep"
            )));
        }
        previous = Some(token);
    }
    Ok(())
}

fn bump(chains: &mut [usize], depth: &mut usize) {
    if let Some(chain) = chains.last_mut() {
        *chain += 1;
        *depth += 1;
    }
}

/// True when `name` can be used as a variable: a letter or `_` followed by letters, digits or `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn sum(input: &str) -> PResult<'_, Expr> {
    let (rest, first) = product(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), product),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '+' => add(vec![acc, rhs]),
            _ => sub(acc, rhs),
        },
    )(rest)
}

fn product(input: &str) -> PResult<'_, Expr> {
    let (rest, first) = unary(input)?;
    fold_many0(
        pair(ws(alt((char('*'), char('/')))), unary),
        move || first.clone(),
        |acc, (op, rhs)| match op {
            '*' => mul(vec![acc, rhs]),
            _ => div(acc, rhs),
        },
    )(rest)
}

fn unary(input: &str) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), neg),
        preceded(ws(char('+')), unary),
        power,
    ))(input)
}

fn power(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = atom(input)?;
    let (rest, exponent) = opt(preceded(
        ws(alt((tag("**"), tag("^")))),
        context("exponent", cut(unary)),
    ))(rest)?;
    let expr = match exponent {
        Some(exp) => pow(base, exp),
        None => base,
    };
    Ok((rest, expr))
}

fn atom(input: &str) -> PResult<'_, Expr> {
    ws(alt((
        delimited(
            char('('),
            sum,
            context("closing parenthesis", cut(ws(char(')')))),
        ),
        number,
        call_or_name,
    )))(input)
}

fn number(input: &str) -> PResult<'_, Expr> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        parse_decimal,
    )(input)
}

fn parse_decimal(text: &str) -> std::result::Result<Expr, num_bigint::ParseBigIntError> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits: BigInt = format!("{whole}{fraction}").parse()?;
    let scale = BigInt::from(10u32).pow(fraction.len() as u32);
    Ok(Expr::Num(Rational::new(digits, scale)))
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn call_or_name(input: &str) -> PResult<'_, Expr> {
    let (rest, name) = identifier(input)?;
    let (rest, args) = opt(delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), sum),
        context("closing parenthesis", cut(ws(char(')')))),
    ))(rest)?;

    match args {
        None => Ok((rest, named_value(name))),
        Some(args) => apply(input, name, args).map(|expr| (rest, expr)),
    }
}

fn named_value(name: &str) -> Expr {
    match name {
        "pi" => Expr::Const(Constant::Pi),
        "E" => Expr::Const(Constant::E),
        other => Expr::sym(other),
    }
}

fn apply<'a>(
    input: &'a str,
    name: &str,
    args: Vec<Expr>,
) -> std::result::Result<Expr, nom::Err<VerboseError<&'a str>>> {
    let failure = |message: &'static str| {
        nom::Err::Failure(VerboseError {
            errors: vec![(input, VerboseErrorKind::Context(message))],
        })
    };

    let mut args = args.into_iter();
    let (first, second, extra) = (args.next(), args.next(), args.next());
    if extra.is_some() {
        return Err(failure("too many arguments"));
    }
    let first = first.ok_or_else(|| failure("missing argument"))?;

    match (name, second) {
        ("sqrt", None) => Ok(sqrt(first)),
        ("log" | "ln", Some(base)) => Ok(div(func(Func::Log, first), func(Func::Log, base))),
        (_, Some(_)) if Func::from_name(name).is_some() => Err(failure("too many arguments")),
        (_, Some(_)) | (_, None) => Func::from_name(name)
            .map(|f| func(f, first))
            .ok_or_else(|| failure("unknown function")),
    }
}
