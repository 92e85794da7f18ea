use crate::address::Address;
use crate::constants::PROGRAM_ID;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub program_id: Address,
}

impl CoreConfig {
    pub fn new(program_id: Address) -> Self {
        Self { program_id }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(
            PROGRAM_ID
                .parse()
                .expect("published program id is a valid address"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program_id() {
        let config = CoreConfig::default();
        assert_eq!(config.program_id.to_string(), PROGRAM_ID);
    }
}
