use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const TABLES: &[(&str, &str)] = &[
    (
        "organizations",
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "profiles",
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL REFERENCES organizations(id),
            display_name VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'musician',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "plans",
        r#"
        CREATE TABLE IF NOT EXISTS plans (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL REFERENCES organizations(id),
            title VARCHAR(255) NOT NULL,
            service_date TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "service_items",
        r#"
        CREATE TABLE IF NOT EXISTS service_items (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            plan_id UUID NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
            sequence_number INTEGER NOT NULL,
            title VARCHAR(255) NOT NULL,
            kind VARCHAR(32) NOT NULL DEFAULT 'other',
            duration_minutes INTEGER NULL,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT non_negative_sequence CHECK (sequence_number >= 0),
            CONSTRAINT unique_plan_sequence UNIQUE (plan_id, sequence_number)
                DEFERRABLE INITIALLY DEFERRED
        );
        "#,
    ),
    (
        "tasks",
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            organization_id UUID NOT NULL REFERENCES organizations(id),
            plan_id UUID NULL REFERENCES plans(id) ON DELETE SET NULL,
            title VARCHAR(255) NOT NULL,
            kind VARCHAR(32) NOT NULL,
            config JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "task_assignments",
        r#"
        CREATE TABLE IF NOT EXISTS task_assignments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            participant_id UUID NOT NULL REFERENCES profiles(id),
            status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
            response_data JSONB NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT unique_task_participant UNIQUE (task_id, participant_id)
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_plans_organization ON plans(organization_id);",
    "CREATE INDEX IF NOT EXISTS idx_service_items_plan ON service_items(plan_id, sequence_number);",
    "CREATE INDEX IF NOT EXISTS idx_tasks_organization ON tasks(organization_id);",
    "CREATE INDEX IF NOT EXISTS idx_task_assignments_task ON task_assignments(task_id);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for (name, ddl) in TABLES {
        tracing::debug!("Creating table {}", name);
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    info!("Database schema initialized successfully");
    Ok(())
}
