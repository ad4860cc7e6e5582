use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

// Constraint names are matched in `repositories::constraint_violation`; keep them in sync.
const TABLES: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS branches (
        id UUID PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        address TEXT NOT NULL,
        phone VARCHAR(20) NOT NULL,
        email VARCHAR(254) NOT NULL,
        photo VARCHAR(255) NULL,
        work_schedule TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_branches_email UNIQUE (email)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        category VARCHAR(10) NOT NULL DEFAULT 'OTHER',
        duration_days INTEGER NOT NULL DEFAULT 14,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_services_name UNIQUE (name),
        CONSTRAINT ck_services_duration CHECK (duration_days BETWEEN 1 AND 365)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS branch_services (
        id UUID PRIMARY KEY,
        branch_id UUID NOT NULL,
        service_id UUID NOT NULL,
        is_available BOOLEAN NOT NULL DEFAULT TRUE,
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_branch_services_pair UNIQUE (branch_id, service_id),
        CONSTRAINT fk_branch_services_branch FOREIGN KEY (branch_id)
            REFERENCES branches(id) ON DELETE CASCADE,
        CONSTRAINT fk_branch_services_service FOREIGN KEY (service_id)
            REFERENCES services(id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_profiles (
        id UUID PRIMARY KEY,
        username VARCHAR(150) NOT NULL,
        full_name VARCHAR(200) NOT NULL,
        email VARCHAR(254) NOT NULL,
        phone VARCHAR(20) NOT NULL DEFAULT '',
        role VARCHAR(20) NOT NULL DEFAULT 'client',
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_user_profiles_username UNIQUE (username),
        CONSTRAINT uq_user_profiles_email UNIQUE (email)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id UUID PRIMARY KEY,
        user_profile_id UUID NOT NULL,
        office_id UUID NOT NULL,
        position VARCHAR(20) NOT NULL DEFAULT 'specialist',
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_employees_user_profile UNIQUE (user_profile_id),
        CONSTRAINT fk_employees_user_profile FOREIGN KEY (user_profile_id)
            REFERENCES user_profiles(id) ON DELETE CASCADE,
        CONSTRAINT fk_employees_office FOREIGN KEY (office_id)
            REFERENCES branches(id) ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id UUID PRIMARY KEY,
        user_profile_id UUID NOT NULL,
        service_id UUID NOT NULL,
        branch_id UUID NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'PENDING',
        visit_date DATE NOT NULL,
        visit_time TIME NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT fk_appointments_user_profile FOREIGN KEY (user_profile_id)
            REFERENCES user_profiles(id) ON DELETE CASCADE,
        CONSTRAINT fk_appointments_service FOREIGN KEY (service_id)
            REFERENCES services(id) ON DELETE RESTRICT,
        CONSTRAINT fk_appointments_branch FOREIGN KEY (branch_id)
            REFERENCES branches(id) ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS history (
        id UUID PRIMARY KEY,
        entity VARCHAR(20) NOT NULL,
        entity_id UUID NOT NULL,
        action VARCHAR(10) NOT NULL,
        snapshot JSONB NOT NULL,
        recorded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
];

const INDEXES: [&str; 8] = [
    "CREATE INDEX IF NOT EXISTS idx_branches_created_at ON branches(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_services_category ON services(category)",
    "CREATE INDEX IF NOT EXISTS idx_branch_services_service_id ON branch_services(service_id)",
    "CREATE INDEX IF NOT EXISTS idx_employees_office_id ON employees(office_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_branch_id ON appointments(branch_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_service_id ON appointments(service_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_user_profile_id ON appointments(user_profile_id)",
    "CREATE INDEX IF NOT EXISTS idx_history_entity ON history(entity, entity_id, recorded_at)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
