pub const SCHEMA: &str = r#"
-- Staff accounts; passwords are stored as argon2id hashes, never plaintext
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Specifications own a monotonic certificate-number sequence
CREATE TABLE IF NOT EXISTS specifications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    last_certificate_number INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Certified client companies
CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    company_name TEXT NOT NULL,
    email TEXT NOT NULL,
    specification_id TEXT NOT NULL REFERENCES specifications(id) ON DELETE RESTRICT,
    certificate_number INTEGER NOT NULL,
    grant_date TEXT,                   -- NULL until a certificate is granted
    created_at TEXT DEFAULT (datetime('now')),

    -- One number per specification, ever
    UNIQUE(specification_id, certificate_number)
);

-- Browser sessions; the cookie carries the raw token, we keep the hash
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- first 8 chars of ID for fast lookup
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT NOT NULL,
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_clients_specification ON clients(specification_id);
CREATE INDEX IF NOT EXISTS idx_clients_grant_date ON clients(grant_date);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_lookup ON sessions(token_lookup);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
"#;
