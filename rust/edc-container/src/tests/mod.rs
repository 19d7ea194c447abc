
#[cfg(test)]
mod malformed_input;
