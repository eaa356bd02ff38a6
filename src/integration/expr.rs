//! Expression tree kept in canonical form by its smart constructors.
//!
//! Subtraction, division and negation have no variants of their own:
//! `a - b` is `a + (-1)*b` and `a / b` is `a * b**-1`. Every constructor in
//! this module (`add`, `mul`, `pow`, `func`) returns a canonical tree, so two
//! equal expressions built through them compare equal structurally.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};

pub type Rational = BigRational;

/// Integer powers above this stay symbolic instead of being evaluated.
const MAX_EXACT_EXPONENT: i64 = 512;
/// Products of sums with more terms than this are left unexpanded.
const EXPAND_TERM_LIMIT: usize = 512;
const EXPAND_POWER_LIMIT: i64 = 32;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "E",
        }
    }

    fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Elementary functions of one argument.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Func {
    Exp,
    Log,
    Abs,
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Abs => "Abs",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Cot => "cot",
            Func::Sec => "sec",
            Func::Csc => "csc",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Asinh => "asinh",
            Func::Acosh => "acosh",
            Func::Atanh => "atanh",
        }
    }

    /// Looks up a function by the names accepted in input expressions.
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "exp" => Func::Exp,
            "log" | "ln" => Func::Log,
            "Abs" | "abs" => Func::Abs,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "cot" => Func::Cot,
            "sec" => Func::Sec,
            "csc" => Func::Csc,
            "asin" | "arcsin" => Func::Asin,
            "acos" | "arccos" => Func::Acos,
            "atan" | "arctan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "asinh" | "arcsinh" => Func::Asinh,
            "acosh" | "arccosh" => Func::Acosh,
            "atanh" | "arctanh" => Func::Atanh,
            _ => return None,
        };
        Some(func)
    }

    /// Odd functions satisfy `f(-a) = -f(a)`.
    fn is_odd(self) -> bool {
        matches!(
            self,
            Func::Sin
                | Func::Tan
                | Func::Cot
                | Func::Csc
                | Func::Asin
                | Func::Atan
                | Func::Sinh
                | Func::Tanh
                | Func::Asinh
                | Func::Atanh
        )
    }

    /// Even functions satisfy `f(-a) = f(a)`.
    fn is_even(self) -> bool {
        matches!(self, Func::Cos | Func::Sec | Func::Cosh | Func::Abs)
    }

    fn apply_f64(self, v: f64) -> f64 {
        match self {
            Func::Exp => v.exp(),
            Func::Log => v.ln(),
            Func::Abs => v.abs(),
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Cot => 1.0 / v.tan(),
            Func::Sec => 1.0 / v.cos(),
            Func::Csc => 1.0 / v.sin(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Asinh => v.asinh(),
            Func::Acosh => v.acosh(),
            Func::Atanh => v.atanh(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Expr {
    Num(Rational),
    Const(Constant),
    Sym(String),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Func(Func, Box<Expr>),
}

impl Expr {
    pub fn sym(name: impl Into<String>) -> Self {
        Expr::Sym(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Num(Rational::from_integer(BigInt::from(value)))
    }

    pub fn rational(numer: i64, denom: i64) -> Self {
        Expr::Num(Rational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(n) if n.is_one())
    }

    pub fn as_num(&self) -> Option<&Rational> {
        match self {
            Expr::Num(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the value when the expression is an integer that fits in `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Num(n) if n.is_integer() => n.to_integer().to_i64(),
            _ => None,
        }
    }

    pub fn is_free_of(&self, var: &str) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => true,
            Expr::Sym(name) => name != var,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(|e| e.is_free_of(var)),
            Expr::Pow(base, exp) => base.is_free_of(var) && exp.is_free_of(var),
            Expr::Func(_, arg) => arg.is_free_of(var),
        }
    }

    /// True for a number below zero or a product whose coefficient is.
    pub fn is_negative_term(&self) -> bool {
        match self {
            Expr::Num(n) => n.is_negative(),
            Expr::Mul(factors) => matches!(factors.first(), Some(Expr::Num(n)) if n.is_negative()),
            _ => false,
        }
    }

    /// Splits off the rational coefficient: `3*x*y -> (3, x*y)`, `5 -> (5, 1)`.
    pub fn split_coeff(&self) -> (Rational, Expr) {
        match self {
            Expr::Num(n) => (n.clone(), one()),
            Expr::Mul(factors) => match factors.split_first() {
                Some((Expr::Num(c), rest)) => (c.clone(), from_factors(rest.to_vec())),
                _ => (Rational::one(), self.clone()),
            },
            other => (Rational::one(), other.clone()),
        }
    }

    /// The base of a power, or the expression itself.
    pub fn base(&self) -> &Expr {
        match self {
            Expr::Pow(base, _) => base,
            other => other,
        }
    }

    /// Replaces every occurrence of `target` by `replacement`, re-canonicalising on the way up.
    pub fn substitute(&self, target: &Expr, replacement: &Expr) -> Expr {
        if self == target {
            return replacement.clone();
        }
        match self {
            Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => self.clone(),
            Expr::Add(terms) => add(terms
                .iter()
                .map(|t| t.substitute(target, replacement))
                .collect()),
            Expr::Mul(factors) => mul(factors
                .iter()
                .map(|f| f.substitute(target, replacement))
                .collect()),
            Expr::Pow(base, exp) => pow(
                base.substitute(target, replacement),
                exp.substitute(target, replacement),
            ),
            Expr::Func(f, arg) => func(*f, arg.substitute(target, replacement)),
        }
    }

    /// Distributes products over sums and expands small positive integer powers of sums.
    pub fn expand(&self) -> Expr {
        match self {
            Expr::Add(terms) => add(terms.iter().map(Expr::expand).collect()),
            Expr::Mul(factors) => factors
                .iter()
                .map(Expr::expand)
                .fold(one(), distribute),
            Expr::Pow(base, exp) => {
                let base = base.expand();
                match (&base, exp.as_integer()) {
                    (Expr::Add(_), Some(n)) if (2..=EXPAND_POWER_LIMIT).contains(&n) => {
                        (0..n).fold(one(), |acc, _| distribute(acc, base.clone()))
                    }
                    _ => pow(base, (**exp).clone()),
                }
            }
            Expr::Func(f, arg) => func(*f, arg.expand()),
            other => other.clone(),
        }
    }

    /// Numeric value under the given bindings; `None` when a symbol is unbound
    /// or the value is not a finite real.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Option<f64> {
        let value = match self {
            Expr::Num(n) => n.numer().to_f64()? / n.denom().to_f64()?,
            Expr::Const(c) => c.value(),
            Expr::Sym(name) => *bindings.get(name)?,
            Expr::Add(terms) => terms
                .iter()
                .map(|t| t.eval(bindings))
                .sum::<Option<f64>>()?,
            Expr::Mul(factors) => factors
                .iter()
                .map(|f| f.eval(bindings))
                .product::<Option<f64>>()?,
            Expr::Pow(base, exp) => base.eval(bindings)?.powf(exp.eval(bindings)?),
            Expr::Func(f, arg) => f.apply_f64(arg.eval(bindings)?),
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::format::render(self))
    }
}

pub fn zero() -> Expr {
    Expr::Num(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Num(Rational::one())
}

pub fn neg(a: Expr) -> Expr {
    mul(vec![Expr::int(-1), a])
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    add(vec![a, neg(b)])
}

pub fn div(a: Expr, b: Expr) -> Expr {
    mul(vec![a, pow(b, Expr::int(-1))])
}

pub fn sqrt(a: Expr) -> Expr {
    pow(a, Expr::rational(1, 2))
}

/// Canonical sum: flattened, like terms collected, numbers folded, sorted.
pub fn add(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        flatten_into(term, &mut flat, |e| matches!(e, Expr::Add(_)));
    }

    let mut constant = Rational::zero();
    let mut collected: BTreeMap<Expr, Rational> = BTreeMap::new();
    for term in flat {
        match term {
            Expr::Num(n) => constant += n,
            other => {
                let (coeff, rest) = other.split_coeff();
                *collected.entry(rest).or_insert_with(Rational::zero) += coeff;
            }
        }
    }

    let mut out: Vec<Expr> = collected
        .into_iter()
        .filter(|(_, coeff)| !coeff.is_zero())
        .map(|(rest, coeff)| with_coeff(coeff, rest))
        .collect();
    if !constant.is_zero() {
        out.push(Expr::Num(constant));
    }

    if out.len() > 1 {
        out.sort();
        Expr::Add(out)
    } else {
        out.pop().unwrap_or_else(zero)
    }
}

/// Canonical product: flattened, coefficient first, equal bases merged.
pub fn mul(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for factor in factors {
        flatten_into(factor, &mut flat, |e| matches!(e, Expr::Mul(_)));
    }

    let mut coeff = Rational::one();
    let mut exponents: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();
    let mut exp_args = Vec::new();
    for factor in flat {
        match factor {
            Expr::Num(n) => {
                if n.is_zero() {
                    return zero();
                }
                coeff *= n;
            }
            Expr::Func(Func::Exp, arg) => exp_args.push(*arg),
            Expr::Pow(base, exp) => exponents.entry(*base).or_default().push(*exp),
            other => exponents.entry(other).or_default().push(one()),
        }
    }
    // exp(a)*exp(b) -> exp(a + b)
    match exp_args.len() {
        0 => {}
        1 => {
            let single = Expr::Func(Func::Exp, Box::new(exp_args.remove(0)));
            exponents.entry(single).or_default().push(one());
        }
        _ => {
            let combined = func(Func::Exp, add(exp_args));
            exponents.entry(combined).or_default().push(one());
        }
    }

    let mut rest = Vec::with_capacity(exponents.len());
    let mut needs_pass = false;
    for (base, exps) in exponents {
        let merged = if exps.len() == 1 {
            pow(base, exps.into_iter().next().unwrap_or_else(one))
        } else {
            pow(base, add(exps))
        };
        match merged {
            Expr::Num(n) if n.is_one() => {}
            Expr::Num(n) => {
                if n.is_zero() {
                    return zero();
                }
                coeff *= n;
            }
            other => {
                needs_pass |= matches!(other, Expr::Mul(_));
                rest.push(other);
            }
        }
    }

    if needs_pass {
        rest.push(Expr::Num(coeff));
        return mul(rest);
    }

    rest.sort_by(factor_order);
    if !coeff.is_one() && rest.len() == 1 {
        if let Expr::Add(terms) = &rest[0] {
            // 數值係數分配到單一總和
            return add(terms
                .iter()
                .map(|t| mul(vec![Expr::Num(coeff.clone()), t.clone()]))
                .collect());
        }
    }
    if !coeff.is_one() {
        rest.insert(0, Expr::Num(coeff));
    }
    from_factors(rest)
}

/// Canonical power.
pub fn pow(base: Expr, exp: Expr) -> Expr {
    if exp.is_zero() || base.is_one() {
        return one();
    }
    if exp.is_one() {
        return base;
    }
    if let (Expr::Num(b), Expr::Num(e)) = (&base, &exp) {
        if let Some(value) = rational_pow(b, e) {
            return Expr::Num(value);
        }
    }
    if base == Expr::Const(Constant::E) {
        return func(Func::Exp, exp);
    }

    if let Some(n) = exp.as_integer() {
        match base {
            Expr::Pow(inner, inner_exp) => {
                return pow(*inner, mul(vec![*inner_exp, Expr::int(n)]));
            }
            Expr::Mul(factors) => {
                return mul(factors
                    .into_iter()
                    .map(|f| pow(f, Expr::int(n)))
                    .collect());
            }
            Expr::Func(Func::Exp, arg) => {
                return func(Func::Exp, mul(vec![*arg, Expr::int(n)]));
            }
            other => return Expr::Pow(Box::new(other), Box::new(exp)),
        }
    }

    Expr::Pow(Box::new(base), Box::new(exp))
}

/// Canonical function application with special values and parity applied.
pub fn func(f: Func, arg: Expr) -> Expr {
    if let Some(value) = special_value(f, &arg) {
        return value;
    }
    if arg.is_negative_term() && (f.is_odd() || f.is_even()) {
        let positive = neg(arg);
        return if f.is_odd() {
            neg(func(f, positive))
        } else {
            func(f, positive)
        };
    }
    Expr::Func(f, Box::new(arg))
}

fn special_value(f: Func, arg: &Expr) -> Option<Expr> {
    let pi = || Expr::Const(Constant::Pi);
    if arg.is_zero() {
        return match f {
            Func::Sin
            | Func::Tan
            | Func::Asin
            | Func::Atan
            | Func::Sinh
            | Func::Tanh
            | Func::Asinh
            | Func::Atanh
            | Func::Abs => Some(zero()),
            Func::Cos | Func::Sec | Func::Cosh | Func::Exp => Some(one()),
            Func::Acos => Some(mul(vec![Expr::rational(1, 2), pi()])),
            _ => None,
        };
    }
    if arg.is_one() {
        return match f {
            Func::Log | Func::Acos => Some(zero()),
            Func::Asin => Some(mul(vec![Expr::rational(1, 2), pi()])),
            Func::Atan => Some(mul(vec![Expr::rational(1, 4), pi()])),
            Func::Abs => Some(one()),
            _ => None,
        };
    }
    match (f, arg) {
        (Func::Abs, Expr::Num(n)) => Some(Expr::Num(n.abs())),
        (Func::Abs, Expr::Func(Func::Abs, _)) => Some(arg.clone()),
        (Func::Log, Expr::Const(Constant::E)) => Some(one()),
        (Func::Exp, Expr::Func(Func::Log, inner)) => Some((**inner).clone()),
        (Func::Sin | Func::Tan, _) if integer_multiple_of_pi(arg).is_some() => Some(zero()),
        (Func::Cos, _) => {
            let n = integer_multiple_of_pi(arg)?;
            Some(if n.is_even() { one() } else { Expr::int(-1) })
        }
        _ => None,
    }
}

fn integer_multiple_of_pi(arg: &Expr) -> Option<BigInt> {
    match arg {
        Expr::Const(Constant::Pi) => Some(BigInt::one()),
        Expr::Mul(factors) => match factors.as_slice() {
            [Expr::Num(n), Expr::Const(Constant::Pi)] if n.is_integer() => Some(n.to_integer()),
            _ => None,
        },
        _ => None,
    }
}

/// Exact `b**e` when the result is rational.
fn rational_pow(b: &Rational, e: &Rational) -> Option<Rational> {
    if e.is_integer() {
        let n = e.to_integer().to_i64()?;
        if n.abs() > MAX_EXACT_EXPONENT || (b.is_zero() && n < 0) {
            return None;
        }
        let k = u32::try_from(n.unsigned_abs()).ok()?;
        let raised = Rational::new(b.numer().pow(k), b.denom().pow(k));
        return Some(if n < 0 { raised.recip() } else { raised });
    }

    if b.is_zero() {
        return e.is_positive().then(Rational::zero);
    }
    if b.is_negative() {
        return None;
    }
    let q = e.denom().to_u32().filter(|q| *q <= 64)?;
    let numer_root = exact_root(b.numer(), q)?;
    let denom_root = exact_root(b.denom(), q)?;
    let root = Rational::new(numer_root, denom_root);
    rational_pow(&root, &Rational::from_integer(e.numer().clone()))
}

fn exact_root(value: &BigInt, n: u32) -> Option<BigInt> {
    let root = value.nth_root(n);
    (Pow::pow(&root, n) == *value).then_some(root)
}

fn flatten_into(expr: Expr, out: &mut Vec<Expr>, is_same: fn(&Expr) -> bool) {
    if is_same(&expr) {
        if let Expr::Add(items) | Expr::Mul(items) = expr {
            for item in items {
                flatten_into(item, out, is_same);
            }
        }
    } else {
        out.push(expr);
    }
}

fn with_coeff(coeff: Rational, rest: Expr) -> Expr {
    if coeff.is_one() {
        return rest;
    }
    match rest {
        Expr::Num(n) => Expr::Num(coeff * n),
        Expr::Mul(mut factors) => {
            factors.insert(0, Expr::Num(coeff));
            Expr::Mul(factors)
        }
        other => Expr::Mul(vec![Expr::Num(coeff), other]),
    }
}

fn from_factors(mut factors: Vec<Expr>) -> Expr {
    if factors.len() > 1 {
        Expr::Mul(factors)
    } else {
        factors.pop().unwrap_or_else(one)
    }
}

/// Orders product factors by base first so that `x**2*y` and `x*y**2` both list `x` first.
fn factor_order(a: &Expr, b: &Expr) -> Ordering {
    a.base().cmp(b.base()).then_with(|| a.cmp(b))
}

fn terms_of(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(terms) => terms,
        other => vec![other],
    }
}

fn distribute(a: Expr, b: Expr) -> Expr {
    let lhs = terms_of(a);
    let rhs = terms_of(b);
    if lhs.len() * rhs.len() > EXPAND_TERM_LIMIT {
        return mul(vec![add(lhs), add(rhs)]);
    }
    add(lhs
        .iter()
        .flat_map(|l| rhs.iter().map(move |r| mul(vec![l.clone(), r.clone()])))
        .collect())
}
