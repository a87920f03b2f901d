//! Diesel schema for casework persistence.

diesel::table! {
    /// Billable cases.
    cases (id) {
        /// Case identifier.
        id -> Uuid,
        /// Client reference.
        client_id -> Uuid,
        /// Free-form case type.
        #[max_length = 255]
        case_type -> Varchar,
        /// Case title.
        #[max_length = 255]
        title -> Varchar,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Optional estimate in seconds.
        estimated_secs -> Nullable<Int8>,
        /// Worked-time rollup in seconds.
        worked_secs -> Int8,
        /// First completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Optional template reference.
        template_id -> Nullable<Uuid>,
        /// Responsible operator.
        operator_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks within cases.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning case.
        case_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Whether the case needs this task completed.
        mandatory -> Bool,
        /// Assigned operator.
        operator_id -> Nullable<Uuid>,
        /// Display position within the case.
        order_index -> Int4,
        /// Optional estimate in seconds.
        estimated_secs -> Nullable<Int8>,
        /// Sum of closed session durations in seconds.
        worked_secs -> Int8,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Optional predecessor task.
        depends_on -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Time-tracking sessions.
    tracking_sessions (id) {
        /// Session identifier.
        id -> Uuid,
        /// Tracked task.
        task_id -> Uuid,
        /// Owning operator.
        operator_id -> Uuid,
        /// Start instant.
        started_at -> Timestamptz,
        /// End instant, null while open.
        ended_at -> Nullable<Timestamptz>,
        /// Duration in seconds, set on close.
        duration_secs -> Nullable<Int8>,
        /// Whether the session was entered manually.
        manual -> Bool,
        /// Interruption kind recorded on pause.
        #[max_length = 50]
        interruption -> Nullable<Varchar>,
        /// How the session was closed.
        #[max_length = 50]
        closure -> Nullable<Varchar>,
        /// Operator or system note.
        note -> Nullable<Text>,
    }
}

diesel::table! {
    /// Append-only activity log.
    activity_entries (seq) {
        /// Append sequence.
        seq -> Int8,
        /// Entry identifier.
        id -> Uuid,
        /// Case the entry belongs to.
        case_id -> Uuid,
        /// Task the entry concerns.
        task_id -> Nullable<Uuid>,
        /// Acting operator.
        operator_id -> Uuid,
        /// Action storage code.
        #[max_length = 50]
        action -> Varchar,
        /// Value before the change.
        old_value -> Nullable<Text>,
        /// Value after the change.
        new_value -> Nullable<Text>,
        /// Structured details.
        metadata -> Jsonb,
        /// Write timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> cases (case_id));
diesel::joinable!(tracking_sessions -> tasks (task_id));
diesel::joinable!(activity_entries -> cases (case_id));
diesel::allow_tables_to_appear_in_same_query!(cases, tasks, tracking_sessions, activity_entries);
