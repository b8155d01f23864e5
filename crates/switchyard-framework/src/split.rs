/// Splits a text command into whitespace-separated tokens.
///
/// Handles:
/// - Space and tab separated arguments
/// - Double-quoted runs, which become one token with the quotes stripped
/// - Empty tokens (including `""`), which are dropped
///
/// An unterminated quote extends to the end of the input.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quote = !in_quote;
            }
            ' ' | '\t' | '\n' | '\r' if !in_quote => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}
