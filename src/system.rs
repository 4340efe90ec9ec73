use std::f64::consts;

use crate::eval::AngleMode;

/// One-argument builtin. `Err` carries why the argument is out of domain.
pub type Builtin = fn(f64, AngleMode) -> Result<f64, &'static str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ctg,
    Asin,
    Acos,
    Atan,
    Log,
    Log2,
    Log10,
    Sqrt,
    Abs,
    Exp,
    /// Unary minus in front of a function call or a parenthesized group.
    Neg,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tg" | "tan" => Func::Tan,
            "ctg" => Func::Ctg,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "log" => Func::Log,
            "log2" => Func::Log2,
            "log10" => Func::Log10,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "exp" => Func::Exp,
            "-" => Func::Neg,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ctg => "ctg",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Log => "log",
            Func::Log2 => "log2",
            Func::Log10 => "log10",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Exp => "exp",
            Func::Neg => "-",
        }
    }

    pub fn builtin(self) -> Builtin {
        match self {
            Func::Sin => sin,
            Func::Cos => cos,
            Func::Tan => tan,
            Func::Ctg => ctg,
            Func::Asin => asin,
            Func::Acos => acos,
            Func::Atan => atan,
            Func::Log => log,
            Func::Log2 => log2,
            Func::Log10 => log10,
            Func::Sqrt => sqrt,
            Func::Abs => abs,
            Func::Exp => exp,
            Func::Neg => neg,
        }
    }

    pub fn apply(self, x: f64, mode: AngleMode) -> Result<f64, &'static str> {
        (self.builtin())(x, mode)
    }
}

pub fn sin(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    Ok(mode.to_radians(x).sin())
}

pub fn cos(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    Ok(mode.to_radians(x).cos())
}

pub fn tan(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    Ok(mode.to_radians(x).tan())
}

pub fn ctg(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    let tan = mode.to_radians(x).tan();
    if tan == 0.0 {
        return Err("ctg is undefined where tan is zero");
    }
    Ok(1.0 / tan)
}

pub fn asin(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    if !(-1.0..=1.0).contains(&x) {
        return Err("asin is only defined on [-1, 1]");
    }
    Ok(mode.angle_from_radians(x.asin()))
}

pub fn acos(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    if !(-1.0..=1.0).contains(&x) {
        return Err("acos is only defined on [-1, 1]");
    }
    Ok(mode.angle_from_radians(x.acos()))
}

pub fn atan(x: f64, mode: AngleMode) -> Result<f64, &'static str> {
    Ok(mode.angle_from_radians(x.atan()))
}

pub fn log(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    if x <= 0.0 {
        return Err("log is only defined for positive numbers");
    }
    Ok(x.ln())
}

pub fn log2(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    if x <= 0.0 {
        return Err("log2 is only defined for positive numbers");
    }
    Ok(x.log2())
}

pub fn log10(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    if x <= 0.0 {
        return Err("log10 is only defined for positive numbers");
    }
    Ok(x.log10())
}

pub fn sqrt(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    if x < 0.0 {
        return Err("sqrt is not defined for negative numbers");
    }
    Ok(x.sqrt())
}

pub fn abs(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    Ok(x.abs())
}

pub fn exp(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    Ok(x.exp())
}

fn neg(x: f64, _: AngleMode) -> Result<f64, &'static str> {
    Ok(-x)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Constant> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn names_round_trip() {
        for func in [
            Func::Sin,
            Func::Cos,
            Func::Tan,
            Func::Ctg,
            Func::Asin,
            Func::Acos,
            Func::Atan,
            Func::Log,
            Func::Log2,
            Func::Log10,
            Func::Sqrt,
            Func::Abs,
            Func::Exp,
            Func::Neg,
        ] {
            assert_eq!(Func::from_name(func.name()), Some(func));
        }
        assert_eq!(Func::from_name("tg"), Some(Func::Tan));
        assert_eq!(Func::from_name("pi"), None);
        assert_eq!(Constant::from_name("sin"), None);
    }

    #[test]
    fn trig_respects_angle_mode() {
        let sin30 = Func::Sin.apply(30.0, AngleMode::Degrees);
        assert!(sin30.is_ok_and(|v| close(v, 0.5)));
        let half_pi = Func::Sin.apply(consts::FRAC_PI_2, AngleMode::Radians);
        assert!(half_pi.is_ok_and(|v| close(v, 1.0)));
        let asin = Func::Asin.apply(0.5, AngleMode::Degrees);
        assert!(asin.is_ok_and(|v| close(v, 30.0)));
        let atan = Func::Atan.apply(1.0, AngleMode::Radians);
        assert!(atan.is_ok_and(|v| close(v, consts::FRAC_PI_4)));
        let ctg = Func::Ctg.apply(45.0, AngleMode::Degrees);
        assert!(ctg.is_ok_and(|v| close(v, 1.0)));
    }

    #[test]
    fn domain_violations() {
        assert!(Func::Log.apply(0.0, AngleMode::Radians).is_err());
        assert!(Func::Log2.apply(-1.0, AngleMode::Radians).is_err());
        assert!(Func::Log10.apply(0.0, AngleMode::Radians).is_err());
        assert!(Func::Sqrt.apply(-4.0, AngleMode::Radians).is_err());
        assert!(Func::Acos.apply(1.5, AngleMode::Degrees).is_err());
        assert!(Func::Ctg.apply(0.0, AngleMode::Degrees).is_err());
        assert_eq!(Func::Sqrt.apply(0.0, AngleMode::Radians), Ok(0.0));
    }

    #[test]
    fn plain_functions() {
        assert_eq!(Func::Abs.apply(-3.0, AngleMode::Degrees), Ok(3.0));
        assert_eq!(Func::Neg.apply(3.0, AngleMode::Degrees), Ok(-3.0));
        assert_eq!(Func::Log2.apply(8.0, AngleMode::Degrees), Ok(3.0));
        assert!(Func::Log.apply(consts::E, AngleMode::Degrees).is_ok_and(|v| close(v, 1.0)));
        assert_eq!(Constant::Pi.value(), consts::PI);
    }
}
