//! Credentials for the data source

use crate::builder::core::CypherFlowBuilder;

impl CypherFlowBuilder {
    /// Authenticate every request with HTTP Basic credentials
    ///
    /// # Examples
    /// ```no_run
    /// use cypherflow::CypherFlow;
    ///
    /// let connector = CypherFlow::connect("http://localhost:7474")
    ///     .basic_auth("neo4j", "secret")
    ///     .build();
    /// ```
    #[must_use]
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config = self.config.with_credentials(user, password);
        self
    }

    /// Send no credentials
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.config.user = None;
        self.config.password = None;
        self
    }
}
