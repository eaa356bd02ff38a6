//! Dense univariate polynomials with rational coefficients.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::expr::{add, mul, pow, Expr, Rational};

const MAX_DEGREE: usize = 64;
/// Rational-root search gives up on coefficients larger than this.
const MAX_ROOT_SEARCH: u64 = 1_000_000;

/// Coefficients stored lowest degree first, without trailing zeros.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<Rational>,
}

impl Poly {
    pub fn new(mut coeffs: Vec<Rational>) -> Self {
        while coeffs.last().is_some_and(Zero::is_zero) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn constant(c: Rational) -> Self {
        Self::new(vec![c])
    }

    /// `x - root`
    pub fn linear_factor(root: &Rational) -> Self {
        Self::new(vec![-root.clone(), Rational::one()])
    }

    /// Reads `expr` as a polynomial in `var`; `None` when any term is not `c*var**k`.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        let expanded = expr.expand();
        let terms = match &expanded {
            Expr::Add(terms) => terms.clone(),
            other => vec![other.clone()],
        };

        let mut coeffs = Vec::new();
        for term in &terms {
            let (coeff, rest) = term.split_coeff();
            let degree = match &rest {
                Expr::Num(n) if n.is_one() => 0,
                Expr::Sym(name) if name == var => 1,
                Expr::Pow(base, exp) => match (&**base, exp.as_integer()) {
                    (Expr::Sym(name), Some(k)) if name == var && k > 0 => usize::try_from(k).ok()?,
                    _ => return None,
                },
                _ => return None,
            };
            if degree > MAX_DEGREE {
                return None;
            }
            if coeffs.len() <= degree {
                coeffs.resize(degree + 1, Rational::zero());
            }
            coeffs[degree] += coeff;
        }
        Some(Self::new(coeffs))
    }

    pub fn to_expr(&self, var: &str) -> Expr {
        let x = Expr::sym(var);
        add(self
            .coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(k, c)| mul(vec![Expr::Num(c.clone()), pow(x.clone(), Expr::int(k as i64))]))
            .collect())
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, with the zero polynomial reported as degree 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeff(&self, k: usize) -> Rational {
        self.coeffs.get(k).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn leading(&self) -> Rational {
        self.coeffs.last().cloned().unwrap_or_else(Rational::zero)
    }

    pub fn scale(&self, factor: &Rational) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        Self::new((0..len).map(|k| self.coeff(k) + other.coeff(k)).collect())
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.scale(&-Rational::one()))
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut out = vec![Rational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self::new(out)
    }

    pub fn pow(&self, n: usize) -> Self {
        (0..n).fold(Self::constant(Rational::one()), |acc, _| acc.mul(self))
    }

    /// Euclidean division; `None` when dividing by zero.
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        if divisor.is_zero() {
            return None;
        }
        let lead = divisor.leading();
        let mut quotient = vec![Rational::zero(); self.coeffs.len().max(1)];
        let mut remainder = self.clone();
        while !remainder.is_zero() && remainder.degree() >= divisor.degree() {
            let shift = remainder.degree() - divisor.degree();
            let factor = remainder.leading() / &lead;
            quotient[shift] += &factor;
            let mut step = vec![Rational::zero(); shift];
            step.extend(divisor.coeffs.iter().map(|c| c * &factor));
            remainder = remainder.sub(&Self::new(step));
        }
        Some((Self::new(quotient), remainder))
    }

    pub fn derivative(&self) -> Self {
        Self::new(self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * Rational::from_integer(BigInt::from(k)))
            .collect())
    }

    /// Antiderivative with zero constant term.
    pub fn integral(&self) -> Self {
        let mut out = vec![Rational::zero()];
        out.extend(self
            .coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c / Rational::from_integer(BigInt::from(k + 1))));
        Self::new(out)
    }

    pub fn eval(&self, at: &Rational) -> Rational {
        self.coeffs
            .iter()
            .rev()
            .fold(Rational::zero(), |acc, c| acc * at + c)
    }

    /// `p(x + shift)`
    pub fn shift(&self, shift: &Rational) -> Self {
        let step = Self::new(vec![shift.clone(), Rational::one()]);
        self.coeffs
            .iter()
            .rev()
            .fold(Self::zero(), |acc, c| acc.mul(&step).add(&Self::constant(c.clone())))
    }

    /// Splits off every rational root, returning the roots with multiplicity and
    /// the monic cofactor that has no rational roots left.
    pub fn split_rational_roots(&self) -> (Vec<(Rational, usize)>, Self) {
        let mut roots: Vec<(Rational, usize)> = Vec::new();
        let mut rest = self.monic();
        while rest.degree() > 0 {
            // 一次式的根直接讀出，不受搜尋上限影響
            let found = if rest.degree() == 1 {
                Some(-rest.coeff(0) / rest.leading())
            } else {
                rest.find_rational_root()
            };
            let Some(root) = found else {
                break;
            };
            let Some((quotient, _)) = rest.div_rem(&Self::linear_factor(&root)) else {
                break;
            };
            rest = quotient;
            match roots.iter_mut().find(|(r, _)| *r == root) {
                Some((_, multiplicity)) => *multiplicity += 1,
                None => roots.push((root, 1)),
            }
        }
        (roots, rest)
    }

    pub fn monic(&self) -> Self {
        let lead = self.leading();
        if lead.is_zero() || lead.is_one() {
            return self.clone();
        }
        self.scale(&lead.recip())
    }

    fn find_rational_root(&self) -> Option<Rational> {
        if self.coeff(0).is_zero() {
            return Some(Rational::zero());
        }
        let integral = self.integer_coefficients();
        let constant = integral.first()?.abs().to_u64()?;
        let lead = integral.last()?.abs().to_u64()?;
        if constant > MAX_ROOT_SEARCH || lead > MAX_ROOT_SEARCH {
            return None;
        }
        for p in divisors(constant) {
            for q in divisors(lead) {
                for sign in [1i64, -1] {
                    let candidate = Rational::new(BigInt::from(p) * sign, BigInt::from(q));
                    if self.eval(&candidate).is_zero() {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Coefficients scaled by the lcm of their denominators.
    fn integer_coefficients(&self) -> Vec<BigInt> {
        let lcm = self
            .coeffs
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        self.coeffs
            .iter()
            .map(|c| (c * Rational::from_integer(lcm.clone())).to_integer())
            .collect()
    }
}

fn divisors(n: u64) -> Vec<u64> {
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d * d != n {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}
