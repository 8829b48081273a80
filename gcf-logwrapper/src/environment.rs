use gcf_logwrapper_client::MonitoredResource;

const PROJECT_VAR: &str = "GCP_PROJECT";
const FUNCTION_NAME_VAR: &str = "FUNCTION_NAME";
const REGION_VAR: &str = "FUNCTION_REGION";

/// Monitored resource type of Cloud Functions
pub const CLOUD_FUNCTION_RESOURCE: &str = "cloud_function";

/// A required environment variable is missing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("{variable} not set")]
    NotSet { variable: &'static str },
}

/// Identity of the running function, as provided by the Cloud Functions runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEnvironment {
    project_id: String,
    function_name: String,
    region: String,
}

impl FunctionEnvironment {
    /// Reads `GCP_PROJECT`, `FUNCTION_NAME` and `FUNCTION_REGION`.
    pub fn from_env() -> Result<Self, EnvironmentError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the function identity through `lookup`. Variables are checked in
    /// the order project, function name, region; an empty value counts as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvironmentError> {
        let require = |variable: &'static str| {
            lookup(variable)
                .filter(|value| !value.is_empty())
                .ok_or(EnvironmentError::NotSet { variable })
        };
        Ok(Self {
            project_id: require(PROJECT_VAR)?,
            function_name: require(FUNCTION_NAME_VAR)?,
            region: require(REGION_VAR)?,
        })
    }

    pub fn new(
        project_id: impl Into<String>,
        function_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            function_name: function_name.into(),
            region: region.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// The `cloud_function` resource every entry is attributed to.
    pub fn monitored_resource(&self) -> MonitoredResource {
        MonitoredResource::new(CLOUD_FUNCTION_RESOURCE)
            .with_label("function_name", &self.function_name)
            .with_label("project_id", &self.project_id)
            .with_label("region", &self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let environment = FunctionEnvironment::from_lookup(lookup(&[
            ("GCP_PROJECT", "projectId"),
            ("FUNCTION_NAME", "functionName"),
            ("FUNCTION_REGION", "region"),
        ]))
        .expect("complete environment");

        assert_eq!(
            environment,
            FunctionEnvironment::new("projectId", "functionName", "region")
        );
        let resource = environment.monitored_resource();
        assert_eq!(resource.resource_type, "cloud_function");
        assert_eq!(resource.label("function_name"), Some("functionName"));
        assert_eq!(resource.label("project_id"), Some("projectId"));
        assert_eq!(resource.label("region"), Some("region"));
        assert_eq!(resource.labels.len(), 3);
    }

    #[test]
    fn reports_first_missing_variable() {
        let error = FunctionEnvironment::from_lookup(lookup(&[])).expect_err("empty environment");
        assert_eq!(error.to_string(), "GCP_PROJECT not set");

        let error = FunctionEnvironment::from_lookup(lookup(&[("GCP_PROJECT", "p")]))
            .expect_err("no function name");
        assert_eq!(error.to_string(), "FUNCTION_NAME not set");

        let error = FunctionEnvironment::from_lookup(lookup(&[
            ("GCP_PROJECT", "p"),
            ("FUNCTION_NAME", "f"),
        ]))
        .expect_err("no region");
        assert_eq!(error.to_string(), "FUNCTION_REGION not set");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let error = FunctionEnvironment::from_lookup(lookup(&[
            ("GCP_PROJECT", ""),
            ("FUNCTION_NAME", "f"),
            ("FUNCTION_REGION", "r"),
        ]))
        .expect_err("empty project");
        assert_eq!(error, EnvironmentError::NotSet { variable: "GCP_PROJECT" });
    }
}
