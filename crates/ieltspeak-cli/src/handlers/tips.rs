//! `ieltspeak tips`: print the parts of the test and practice tips.

use crate::presentation::format_tips;

pub fn execute() {
    print!("{}", format_tips());
}
