use super::expr::{add, func, mul, neg, one, pow, sqrt, sub, zero, Expr, Func};

/// Derivative of `expr` with respect to `var`, in canonical form.
///
/// Used by the integrator to recognise affine arguments and `g'(x)` cofactors.
pub fn differentiate(expr: &Expr, var: &str) -> Expr {
    Differentiator { var }.derive(expr)
}

struct Differentiator<'a> {
    var: &'a str,
}

impl Differentiator<'_> {
    fn derive(&self, expr: &Expr) -> Expr {
        if expr.is_free_of(self.var) {
            return zero();
        }
        match expr {
            Expr::Num(_) | Expr::Const(_) => zero(),
            Expr::Sym(_) => one(),
            Expr::Add(terms) => add(terms.iter().map(|t| self.derive(t)).collect()),
            Expr::Mul(factors) => self.product_rule(factors),
            Expr::Pow(base, exp) => self.power_rule(base, exp),
            Expr::Func(f, arg) => self.chain_rule(*f, arg),
        }
    }

    fn product_rule(&self, factors: &[Expr]) -> Expr {
        let terms = factors
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_free_of(self.var))
            .map(|(i, f)| {
                let mut parts: Vec<Expr> = factors
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, other)| other.clone())
                    .collect();
                parts.push(self.derive(f));
                mul(parts)
            })
            .collect();
        add(terms)
    }

    fn power_rule(&self, base: &Expr, exp: &Expr) -> Expr {
        let power = pow(base.clone(), exp.clone());
        if exp.is_free_of(self.var) {
            return mul(vec![
                exp.clone(),
                pow(base.clone(), add(vec![exp.clone(), Expr::int(-1)])),
                self.derive(base),
            ]);
        }
        if base.is_free_of(self.var) {
            return mul(vec![power, func(Func::Log, base.clone()), self.derive(exp)]);
        }
        // d(u**v) = u**v * (v'*log(u) + v*u'/u)
        mul(vec![
            power,
            add(vec![
                mul(vec![self.derive(exp), func(Func::Log, base.clone())]),
                mul(vec![
                    exp.clone(),
                    self.derive(base),
                    pow(base.clone(), Expr::int(-1)),
                ]),
            ]),
        ])
    }

    fn chain_rule(&self, f: Func, arg: &Expr) -> Expr {
        let u = || arg.clone();
        let squared = |e: Expr| pow(e, Expr::int(2));
        let outer = match f {
            Func::Exp => func(Func::Exp, u()),
            Func::Log => pow(u(), Expr::int(-1)),
            Func::Abs => mul(vec![u(), pow(func(Func::Abs, u()), Expr::int(-1))]),
            Func::Sin => func(Func::Cos, u()),
            Func::Cos => neg(func(Func::Sin, u())),
            Func::Tan => add(vec![one(), squared(func(Func::Tan, u()))]),
            Func::Cot => neg(add(vec![one(), squared(func(Func::Cot, u()))])),
            Func::Sec => mul(vec![func(Func::Sec, u()), func(Func::Tan, u())]),
            Func::Csc => neg(mul(vec![func(Func::Csc, u()), func(Func::Cot, u())])),
            Func::Asin => pow(sqrt(sub(one(), squared(u()))), Expr::int(-1)),
            Func::Acos => neg(pow(sqrt(sub(one(), squared(u()))), Expr::int(-1))),
            Func::Atan => pow(add(vec![squared(u()), one()]), Expr::int(-1)),
            Func::Sinh => func(Func::Cosh, u()),
            Func::Cosh => func(Func::Sinh, u()),
            Func::Tanh => sub(one(), squared(func(Func::Tanh, u()))),
            Func::Asinh => pow(sqrt(add(vec![squared(u()), one()])), Expr::int(-1)),
            Func::Acosh => pow(sqrt(sub(squared(u()), one())), Expr::int(-1)),
            Func::Atanh => pow(sub(one(), squared(u())), Expr::int(-1)),
        };
        mul(vec![outer, self.derive(arg)])
    }
}
