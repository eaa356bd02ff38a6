//! Renders canonical expressions in the usual Python computer-algebra notation:
//! `**` for powers, `x**3/3` instead of `1/3*x**3`, `sqrt(x)` for `x**(1/2)`.

use std::cmp::Ordering;

use num_traits::{One, Signed, Zero};

use super::expr::{neg, pow, Expr, Rational};

pub fn render(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => render_rational(n),
        Expr::Const(c) => c.name().to_string(),
        Expr::Sym(name) => name.clone(),
        Expr::Add(terms) => render_sum(terms),
        Expr::Mul(_) | Expr::Pow(..) => render_product(expr),
        Expr::Func(f, arg) => format!("{}({})", f.name(), render(arg)),
    }
}

/// Renders an integral the engine could not evaluate, e.g. `Integral(exp(x**2), x)`.
pub fn render_unevaluated_integral(integrand: &Expr, var: &str) -> String {
    format!("Integral({}, {})", render(integrand), var)
}

fn render_rational(n: &Rational) -> String {
    if n.is_integer() {
        n.numer().to_string()
    } else {
        format!("{}/{}", n.numer(), n.denom())
    }
}

fn render_sum(terms: &[Expr]) -> String {
    let mut ordered: Vec<&Expr> = terms.iter().collect();
    ordered.sort_by(|a, b| print_order(a, b));
    // `1 - x**2` rather than `-x**2 + 1`
    if let Some(first_positive) = ordered.iter().position(|t| !t.is_negative_term()) {
        let term = ordered.remove(first_positive);
        ordered.insert(0, term);
    }

    let mut out = String::new();
    for (i, term) in ordered.into_iter().enumerate() {
        if i == 0 {
            out.push_str(&render(term));
        } else if term.is_negative_term() {
            out.push_str(" - ");
            out.push_str(&render(&neg(term.clone())));
        } else {
            out.push_str(" + ");
            out.push_str(&render(term));
        }
    }
    out
}

/// Higher degree first, numbers last, positive terms before negative ones.
fn print_order(a: &Expr, b: &Expr) -> Ordering {
    let (coeff_a, rest_a) = a.split_coeff();
    let (coeff_b, rest_b) = b.split_coeff();
    degree(&rest_b)
        .cmp(&degree(&rest_a))
        .then_with(|| matches!(a, Expr::Num(_)).cmp(&matches!(b, Expr::Num(_))))
        .then_with(|| coeff_a.is_negative().cmp(&coeff_b.is_negative()))
        .then_with(|| rest_a.cmp(&rest_b))
}

/// Sum of the numeric exponents of plain symbols in a monomial.
fn degree(expr: &Expr) -> Rational {
    match expr {
        Expr::Sym(_) => Rational::one(),
        Expr::Pow(base, exp) => match (&**base, &**exp) {
            (Expr::Sym(_), Expr::Num(e)) => e.clone(),
            _ => Rational::zero(),
        },
        Expr::Mul(factors) => factors.iter().map(degree).sum(),
        _ => Rational::zero(),
    }
}

fn render_product(expr: &Expr) -> String {
    let (coeff, factors): (Rational, Vec<Expr>) = match expr {
        Expr::Mul(items) => match items.split_first() {
            Some((Expr::Num(c), rest)) => (c.clone(), rest.to_vec()),
            _ => (Rational::one(), items.clone()),
        },
        other => (Rational::one(), vec![other.clone()]),
    };

    let sign = if coeff.is_negative() { "-" } else { "" };
    let coeff = coeff.abs();
    let mut numer = Vec::new();
    let mut denom = Vec::new();
    if !coeff.numer().is_one() {
        numer.push(coeff.numer().to_string());
    }
    if !coeff.denom().is_one() {
        denom.push(coeff.denom().to_string());
    }

    for factor in &factors {
        match factor {
            Expr::Pow(base, exp) if exp.is_negative_term() && exp.as_num().is_some() => {
                let flipped = pow((**base).clone(), neg((**exp).clone()));
                denom.push(render_factor(&flipped));
            }
            other => numer.push(render_factor(other)),
        }
    }

    let numer = if numer.is_empty() {
        "1".to_string()
    } else {
        numer.join("*")
    };
    match denom.len() {
        0 => format!("{sign}{numer}"),
        1 => format!("{sign}{numer}/{}", denom[0]),
        _ => format!("{sign}{numer}/({})", denom.join("*")),
    }
}

fn render_factor(expr: &Expr) -> String {
    match expr {
        Expr::Add(_) => format!("({})", render(expr)),
        Expr::Pow(base, exp) => render_power(base, exp),
        other => render(other),
    }
}

fn render_power(base: &Expr, exp: &Expr) -> String {
    if *exp == Expr::rational(1, 2) {
        return format!("sqrt({})", render(base));
    }
    if exp.is_negative_term() {
        if let Some(n) = exp.as_num() {
            // Only reachable for a power nested inside another power's base or exponent.
            return format!("1/{}", render_power(base, &Expr::Num(-n)));
        }
    }

    let base_str = match base {
        Expr::Add(_) | Expr::Mul(_) | Expr::Pow(..) => format!("({})", render(base)),
        Expr::Num(n) if n.is_negative() || !n.is_integer() => format!("({})", render(base)),
        other => render(other),
    };
    let exp_str = match exp {
        Expr::Sym(_) | Expr::Const(_) | Expr::Func(..) => render(exp),
        Expr::Num(n) if n.is_integer() && !n.is_negative() => render(exp),
        other => format!("({})", render(other)),
    };
    format!("{base_str}**{exp_str}")
}
