// environment_provider.rs — Environment variable abstraction
//
// Both the FOLDERICON defaults and %VAR% expansion inside IconResource
// values read the environment through this trait, so neither depends on
// the real process environment under test.

/// Read-only access to environment variables.
pub trait EnvironmentProvider {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  get_env_var
    //
    //  Returns the value of the named environment variable, if set.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn get_env_var(&self, name: &str) -> Option<String>;
}





/// Reads from the actual process environment.
pub struct ProcessEnvironment;





impl EnvironmentProvider for ProcessEnvironment {
    fn get_env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}





/// Fixed set of variables for unit tests.
#[cfg(test)]
#[derive(Default)]
pub struct MockEnvironment {
    vars: std::collections::HashMap<String, String>,
}





#[cfg(test)]
impl MockEnvironment {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  with
    //
    //  Builder-style setter: returns the mock with one more variable.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_ascii_uppercase(), value.into());
        self
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl EnvironmentProvider for MockEnvironment
//
//  Lookups are case-insensitive, like the Windows environment block.
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_env_var(&self, name: &str) -> Option<String> {
        self.vars.get(&name.to_ascii_uppercase()).cloned()
    }
}





#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_environment_returns_none_for_missing() {
        let provider = ProcessEnvironment;
        assert!(provider.get_env_var("FOLDERICON_NONEXISTENT_VAR_12345").is_none());
    }

    #[test]
    fn mock_lookup_ignores_case() {
        let mock = MockEnvironment::default().with("SystemRoot", r"C:\Windows");
        assert_eq!(mock.get_env_var("SYSTEMROOT"), Some(r"C:\Windows".into()));
        assert_eq!(mock.get_env_var("systemroot"), Some(r"C:\Windows".into()));
    }

    #[test]
    fn mock_returns_none_for_unset() {
        let mock = MockEnvironment::default();
        assert!(mock.get_env_var("FOLDERICON").is_none());
    }
}
