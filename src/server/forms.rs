use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ClientForm {
    pub company_name: String,
    pub email: String,
    pub specification_id: String,
    /// Empty string when the date input is left blank.
    #[serde(default)]
    pub grant_date: Option<String>,
}
