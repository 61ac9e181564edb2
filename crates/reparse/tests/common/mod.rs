#![allow(dead_code)]

use reparse::semantics::{base_semantics, operator_semantics};
use reparse::{ComboSemantics, Grammar};
use std::sync::Arc;

pub const CALC: &str = "
start =  exp0.
exp0  :  exp1 ( '+'  exp1 :add
              | '-'  exp1 :sub )*.
exp1  :  exp2 ( '*'  exp2 :mul
              | '//' exp2 :div
              | '/'  exp2 :truediv
              | '%'  exp2 :mod )*.
exp2  :  exp3 ( '^'  exp2 :pow )?.
exp3  :  '(' exp0 ')'
      |  '-' exp1 :neg
      |  {digit+} :int.
digit =  '0'..'9'.
";

pub fn calc_grammar() -> Arc<Grammar> {
    Grammar::compile(CALC).expect("calculator grammar compiles")
}

pub fn calc_semantics() -> ComboSemantics {
    ComboSemantics::new()
        .with(operator_semantics())
        .with(base_semantics())
}
