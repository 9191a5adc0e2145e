//! Server-rendered HTML views.
//!
//! Every page template is compiled into the binary and registered once at
//! startup. Handlers pass page data as JSON values.

use axum::response::Html;
use handlebars::Handlebars;
use serde_json::Value;

use super::response::PageError;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>certdesk - {{title}}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #2d3436; background: #f0f2f5; padding: 20px; }
        .container { max-width: 960px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 1px 6px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; margin-bottom: 20px; }
        nav { margin-bottom: 25px; padding-bottom: 12px; border-bottom: 2px solid #2c7be5; }
        nav a { margin-right: 15px; color: #2c7be5; text-decoration: none; font-weight: 500; }
        nav .who { float: right; color: #7f8c8d; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { padding: 10px 12px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background: #2c3e50; color: white; }
        form label { display: block; margin-top: 12px; font-weight: 500; }
        form input, form select { width: 100%; max-width: 400px; padding: 8px; margin-top: 4px; border: 1px solid #ccc; border-radius: 4px; }
        form button { margin-top: 18px; padding: 10px 24px; background: #2c7be5; color: white; border: none; border-radius: 4px; cursor: pointer; }
        .flash { background: #d4edda; color: #155724; padding: 12px; border-radius: 4px; margin-bottom: 16px; }
        .error { background: #f8d7da; color: #721c24; padding: 12px; border-radius: 4px; margin-bottom: 16px; }
        .warn { color: #c0392b; font-weight: bold; }
        .stat { font-size: 2em; font-weight: bold; color: #2c7be5; }
    </style>
</head>
<body>
    <div class="container">
{{#if username}}
        <nav>
            <a href="/dashboard">Dashboard</a>
            <a href="/clients">Clients</a>
            <a href="/users">Users</a>
            <a href="/change_password">Change password</a>
            <a href="/logout">Log out</a>
            <span class="who">{{username}}</span>
        </nav>
{{/if}}
{{#if flash}}
        <div class="flash">{{flash}}</div>
{{/if}}
{{#if error}}
        <div class="error">{{error}}</div>
{{/if}}
"#;

const FOOT: &str = r#"    </div>
</body>
</html>
"#;

const LOGIN: &str = r#"{{> head}}
        <h1>Sign in</h1>
        <form method="post" action="/login">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" required autofocus>
            <label for="password">Password</label>
            <input type="password" id="password" name="password" required>
            <button type="submit">Sign in</button>
        </form>
{{> foot}}"#;

const DASHBOARD: &str = r#"{{> head}}
        <h1>Dashboard</h1>
        <p>Registered clients: <span class="stat">{{total_clients}}</span></p>
        <h2>Certificates near expiry</h2>
{{#if alert_clients}}
        <table>
            <thead><tr><th>Company</th><th>Specification</th><th>Certificate #</th><th>Granted</th><th>Days ago</th></tr></thead>
            <tbody>
{{#each alert_clients}}
                <tr>
                    <td>{{company_name}}</td>
                    <td>{{specification_name}}</td>
                    <td>{{certificate_number}}</td>
                    <td>{{grant_date}}</td>
                    <td class="warn">{{days_since_grant}}</td>
                </tr>
{{/each}}
            </tbody>
        </table>
{{else}}
        <p>No certificates are near expiry.</p>
{{/if}}
{{> foot}}"#;

const USERS: &str = r#"{{> head}}
        <h1>Staff users</h1>
        <table>
            <thead><tr><th>Username</th><th>Created</th></tr></thead>
            <tbody>
{{#each users}}
                <tr><td>{{username}}</td><td>{{created_at}}</td></tr>
{{/each}}
            </tbody>
        </table>
{{> foot}}"#;

const CLIENTS: &str = r#"{{> head}}
        <h1>Clients</h1>
        <p><a href="/client_form">Add client</a> | <a href="/export_clients">Export to spreadsheet</a></p>
{{#if clients}}
        <table>
            <thead><tr><th>Company</th><th>Email</th><th>Specification</th><th>Certificate #</th><th>Granted</th></tr></thead>
            <tbody>
{{#each clients}}
                <tr>
                    <td>{{company_name}}</td>
                    <td>{{email}}</td>
                    <td>{{specification_name}}</td>
                    <td>{{certificate_number}}</td>
                    <td>{{grant_date}}</td>
                </tr>
{{/each}}
            </tbody>
        </table>
{{else}}
        <p>No clients registered yet.</p>
{{/if}}
{{> foot}}"#;

const CLIENT_FORM: &str = r#"{{> head}}
        <h1>New client</h1>
{{#if specifications}}
        <form method="post" action="/client_form">
            <label for="company_name">Company name</label>
            <input type="text" id="company_name" name="company_name" value="{{company_name}}" required>
            <label for="email">Email</label>
            <input type="email" id="email" name="email" value="{{email}}" required>
            <label for="specification_id">Specification</label>
            <select id="specification_id" name="specification_id" required>
{{#each specifications}}
                <option value="{{id}}">{{name}}</option>
{{/each}}
            </select>
            <label for="grant_date">Grant date (optional)</label>
            <input type="date" id="grant_date" name="grant_date">
            <button type="submit">Save client</button>
        </form>
{{else}}
        <p>No specifications exist yet. Seed one with <code>certdesk admin spec add</code>.</p>
{{/if}}
{{> foot}}"#;

const CHANGE_PASSWORD: &str = r#"{{> head}}
        <h1>Change password</h1>
        <form method="post" action="/change_password">
            <label for="new_password">New password</label>
            <input type="password" id="new_password" name="new_password" required>
            <button type="submit">Update password</button>
        </form>
{{> foot}}"#;

const EXPORT: &str = r#"{{> head}}
        <h1>Export complete</h1>
        <p>Wrote {{row_count}} client record(s) to:</p>
        <p><code>{{path}}</code></p>
        <p><a href="/clients">Back to clients</a></p>
{{> foot}}"#;

pub struct Templates {
    registry: Handlebars<'static>,
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

impl Templates {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();

        for (name, template) in [
            ("head", HEAD),
            ("foot", FOOT),
            ("login", LOGIN),
            ("dashboard", DASHBOARD),
            ("users", USERS),
            ("clients", CLIENTS),
            ("client_form", CLIENT_FORM),
            ("change_password", CHANGE_PASSWORD),
            ("export", EXPORT),
        ] {
            registry
                .register_template_string(name, template)
                .expect("invalid built-in template");
        }

        Self { registry }
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<Html<String>, PageError> {
        self.registry
            .render(name, data)
            .map(Html)
            .map_err(|e| {
                tracing::error!("Failed to render template '{name}': {e}");
                PageError::internal("Failed to render page")
            })
    }
}
