//! SQL schema definitions.

/// Complete schema for the Spindle v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Tenancy
-- ============================================================

CREATE TABLE IF NOT EXISTS tenants (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_locked INTEGER NOT NULL DEFAULT 0,
    plan_campaign_limit INTEGER,
    plan_spin_limit INTEGER,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tenant_limit_overrides (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    bonus_spins INTEGER NOT NULL DEFAULT 0,
    bonus_vouchers INTEGER NOT NULL DEFAULT 0,
    reason TEXT NOT NULL,
    granted_by TEXT NOT NULL,
    expires_at INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_overrides_tenant ON tenant_limit_overrides(tenant_id, is_active);

CREATE TABLE IF NOT EXISTS tenant_usage (
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    month TEXT NOT NULL,
    campaigns_created INTEGER NOT NULL DEFAULT 0,
    spins_used INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (tenant_id, month)
);

-- ============================================================
-- Campaigns & Prizes
-- ============================================================

CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    name TEXT NOT NULL,
    spin_limit INTEGER NOT NULL DEFAULT 1,
    spin_cooldown_hours INTEGER NOT NULL DEFAULT 24,
    referrals_required_for_spin INTEGER NOT NULL DEFAULT 3,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_archived INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_campaigns_tenant ON campaigns(tenant_id);

CREATE TABLE IF NOT EXISTS prizes (
    id INTEGER PRIMARY KEY,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    label TEXT NOT NULL,
    weight INTEGER NOT NULL CHECK (weight > 0),
    current_stock INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_prizes_campaign ON prizes(campaign_id, is_active);

-- ============================================================
-- End-users & Bonus accrual
-- ============================================================

CREATE TABLE IF NOT EXISTS end_users (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    phone TEXT NOT NULL,
    referral_code TEXT NOT NULL,
    referred_by_id INTEGER REFERENCES end_users(id),
    successful_referrals INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    UNIQUE (tenant_id, phone),
    UNIQUE (tenant_id, referral_code)
);

-- One row per referred user: re-processing the same referral is a no-op.
CREATE TABLE IF NOT EXISTS referral_credits (
    referred_user_id INTEGER PRIMARY KEY REFERENCES end_users(id),
    referrer_id INTEGER NOT NULL REFERENCES end_users(id),
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    credited_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_referral_credits_referrer ON referral_credits(referrer_id);

-- ============================================================
-- Spins & Vouchers
-- ============================================================

CREATE TABLE IF NOT EXISTS spins (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    user_id INTEGER NOT NULL REFERENCES end_users(id),
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    spin_date INTEGER NOT NULL,
    is_referral_bonus INTEGER NOT NULL DEFAULT 0,
    won_prize INTEGER NOT NULL DEFAULT 0,
    prize_id INTEGER REFERENCES prizes(id)
);

CREATE INDEX IF NOT EXISTS idx_spins_user_campaign ON spins(user_id, campaign_id, spin_date);

CREATE TABLE IF NOT EXISTS vouchers (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    user_id INTEGER NOT NULL REFERENCES end_users(id),
    spin_id INTEGER NOT NULL UNIQUE REFERENCES spins(id),
    prize_id INTEGER NOT NULL REFERENCES prizes(id),
    code TEXT NOT NULL UNIQUE,
    is_redeemed INTEGER NOT NULL DEFAULT 0,
    redeemed_at INTEGER,
    expires_at INTEGER,
    issued_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_vouchers_user ON vouchers(user_id);

-- ============================================================
-- Staff & Approvals
-- ============================================================

CREATE TABLE IF NOT EXISTS managers (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    name TEXT NOT NULL,
    pin_hash TEXT NOT NULL,
    max_bonus_spins_per_approval INTEGER NOT NULL,
    max_spins_per_user INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_managers_tenant ON managers(tenant_id);

CREATE TABLE IF NOT EXISTS social_tasks (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id),
    title TEXT NOT NULL,
    reward_spins INTEGER NOT NULL CHECK (reward_spins >= 0),
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS task_completions (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    user_id INTEGER NOT NULL REFERENCES end_users(id),
    task_id INTEGER NOT NULL REFERENCES social_tasks(id),
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'approved', 'rejected')),
    decided_by INTEGER REFERENCES managers(id),
    decided_at INTEGER,
    submitted_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_completions_tenant_status ON task_completions(tenant_id, status);

-- Manager-side bonus grants, one tagged entry per grant, summed on read.
CREATE TABLE IF NOT EXISTS bonus_ledger (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    user_id INTEGER NOT NULL REFERENCES end_users(id),
    source TEXT NOT NULL CHECK (source IN ('task_verification', 'direct_grant', 'override')),
    amount INTEGER NOT NULL CHECK (amount >= 0),
    manager_id INTEGER REFERENCES managers(id),
    task_completion_id INTEGER REFERENCES task_completions(id),
    reason TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bonus_ledger_user ON bonus_ledger(user_id);

-- ============================================================
-- Audit log
-- ============================================================

CREATE TABLE IF NOT EXISTS manager_audit_log (
    id INTEGER PRIMARY KEY,
    tenant_id INTEGER NOT NULL REFERENCES tenants(id),
    manager_id INTEGER NOT NULL REFERENCES managers(id),
    action TEXT NOT NULL CHECK (action IN ('APPROVE', 'REJECT', 'GRANT')),
    task_completion_id INTEGER REFERENCES task_completions(id),
    user_id INTEGER REFERENCES end_users(id),
    bonus_spins_granted INTEGER NOT NULL DEFAULT 0,
    comment TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_tenant_created ON manager_audit_log(tenant_id, created_at);
CREATE INDEX IF NOT EXISTS idx_audit_manager ON manager_audit_log(manager_id);

-- ============================================================
-- Append-only enforcement
-- ============================================================

-- Audit rows and spin events are ground truth; reject mutation at the
-- store level rather than trusting call-site discipline.

CREATE TRIGGER IF NOT EXISTS audit_log_no_update
BEFORE UPDATE ON manager_audit_log
BEGIN
    SELECT RAISE(ABORT, 'manager_audit_log is append-only');
END;

CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
BEFORE DELETE ON manager_audit_log
BEGIN
    SELECT RAISE(ABORT, 'manager_audit_log is append-only');
END;

CREATE TRIGGER IF NOT EXISTS spins_no_update
BEFORE UPDATE ON spins
BEGIN
    SELECT RAISE(ABORT, 'spins are append-only');
END;

CREATE TRIGGER IF NOT EXISTS spins_no_delete
BEFORE DELETE ON spins
BEGIN
    SELECT RAISE(ABORT, 'spins are append-only');
END;
"#;
