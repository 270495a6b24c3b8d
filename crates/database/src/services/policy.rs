/// Settings that govern how accounts are created and provisioned
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    /// Password given to accounts synthesized from profiles.
    ///
    /// When `None`, each such account receives a random password that nobody
    /// knows, so an administrator has to set one before the owner can log in.
    pub default_password: Option<String>,
    /// Provision a student profile when provisioning a requested professor
    /// profile fails, instead of leaving the account without a profile.
    pub fallback_to_student: bool,
    /// bcrypt cost factor
    pub password_cost: u32,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            default_password: None,
            fallback_to_student: true,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}
