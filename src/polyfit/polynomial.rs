/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::fmt;

/// Polynomial is a statically allocated polynomial.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Polynomial<const SIZE: usize> {
    /// Coefficients are ordered by their power, e.g. index 0 is to the power 0, 1 is linear, 2 is quadratic, etc.
    pub coefficients: [f64; SIZE],
}

impl<const SIZE: usize> Polynomial<SIZE> {
    pub const fn new(coefficients: [f64; SIZE]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the polynomial at the provided position
    pub fn eval(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).0
    }

    /// Evaluate the derivative at the provided position
    pub fn deriv(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).1
    }

    /// Evaluate the polynomial and its derivative at the provided position, with Horner's method
    pub fn eval_n_deriv(&self, x: f64) -> (f64, f64) {
        match SIZE {
            0 => (0.0, 0.0),
            1 => (self.coefficients[0], 0.0),
            _ => {
                let mut acc_eval = self.coefficients[SIZE - 1];
                let mut acc_deriv = self.coefficients[SIZE - 1];
                // Every coefficient except the constant and the largest
                for val in self.coefficients.iter().skip(1).rev().skip(1) {
                    acc_eval = acc_eval * x + *val;
                    acc_deriv = acc_deriv * x + acc_eval;
                }
                acc_eval = x * acc_eval + self.coefficients[0];

                (acc_eval, acc_deriv)
            }
        }
    }

    fn fmt_with_var(&self, f: &mut fmt::Formatter, var: &str) -> fmt::Result {
        write!(f, "P({var}) = ")?;
        let mut data = Vec::with_capacity(SIZE);

        for (i, c) in self.coefficients.iter().enumerate().rev() {
            if c.abs() <= f64::EPSILON {
                continue;
            }

            let mut d = if c.abs() > 100.0 || c.abs() < 0.01 {
                format!("{c:+e}")
            } else {
                format!("{c:+}")
            };
            match i {
                0 => {}
                1 => d = format!("{d}{var}"),
                _ => d = format!("{d}{var}^{i}"),
            }
            data.push(d);
        }
        write!(f, "{}", data.join(" "))
    }
}

impl<const SIZE: usize> fmt::Display for Polynomial<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_var(f, "t")
    }
}

#[test]
fn poly_quadratic() {
    let p = Polynomial::new([101.0, -2.0, 3.0]);
    for i in -100..=100 {
        let x = i as f64;
        let expect = 3.0 * x.powi(2) - 2.0 * x + 101.0;
        let expect_deriv = 6.0 * x - 2.0;
        assert!(
            (p.eval(x) - expect).abs() < 2e-16,
            "Polynomial returned wrong value"
        );
        assert!(
            (p.deriv(x) - expect_deriv).abs() < 2e-16,
            "Polynomial derivative returned wrong value"
        );
    }
}

#[test]
fn poly_print() {
    let p = Polynomial::new([101.0, -2.0, 3.0]);
    println!("{p}");
    assert_eq!(format!("{p}"), "P(t) = +3t^2 -2t +1.01e2");
    assert_eq!(format!("{}", Polynomial::new([0.0, 30.0])), "P(t) = +30t");
}
