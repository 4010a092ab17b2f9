// src/endpoint.rs

use crate::user::USER_CLASS_NAME;

/// Every REST resource this client talks to, relative to the configured server URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `classes/<class>`; `_User` maps to `users`.
    Classes(&'a str),
    /// `classes/<class>/<objectId>`; `_User` maps to `users/<objectId>`.
    Object(&'a str, &'a str),
    Users,
    User(&'a str),
    Me,
    Login,
    Logout,
    RequestPasswordReset,
    Function(&'a str),
    Job(&'a str),
    Event(&'a str),
    File(&'a str),
}

impl<'a> Endpoint<'a> {
    /// Unencoded path segments. Percent-encoding happens when they are pushed onto the base URL.
    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            Endpoint::Classes(class) if class == USER_CLASS_NAME => vec!["users"],
            Endpoint::Classes(class) => vec!["classes", class],
            Endpoint::Object(class, id) if class == USER_CLASS_NAME => vec!["users", id],
            Endpoint::Object(class, id) => vec!["classes", class, id],
            Endpoint::Users => vec!["users"],
            Endpoint::User(id) => vec!["users", id],
            Endpoint::Me => vec!["users", "me"],
            Endpoint::Login => vec!["login"],
            Endpoint::Logout => vec!["logout"],
            Endpoint::RequestPasswordReset => vec!["requestPasswordReset"],
            Endpoint::Function(name) => vec!["functions", name],
            Endpoint::Job(name) => vec!["jobs", name],
            Endpoint::Event(name) => vec!["events", name],
            Endpoint::File(name) => vec!["files", name],
        }
    }

    /// The path template rendered with `/` separators, used in logs and errors.
    pub fn path(&self) -> String {
        self.segments().join("/")
    }
}

impl std::fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
