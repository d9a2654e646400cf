use super::fact_keys;

fact_keys! {
    /// Cross-cutting keys shared by every orchestration run.
    pub enum GenericKey in "" {
        Status => "STATUS", "Outcome of the run: success or error";
        Valid => "VALID", "Whether every payload of the run normalized successfully";
        Id => "ID", "Generic identifier of the primary entity of the run";
        Name => "NAME", "Generic display name of the primary entity of the run";
        Count => "COUNT", "Number of entities normalized in the run";
        EntityType => "ENTITY_TYPE", "Kind of entity normalized in the run";
        SourceFormat => "SOURCE_FORMAT", "Wire shape the payload was read from";
        GeneratedAt => "GENERATED_AT", "Reference instant used for derived computations";
        ErrorType => "ERROR_TYPE", "Kind of the terminal error, when the run failed";
        ErrorMessage => "ERROR_MESSAGE", "Message of the terminal error, when the run failed";
        RecoverySuggestion => "RECOVERY_SUGGESTION", "Prefix of the numbered recovery suggestions of a failed run";
        ErrorContext => "ERROR_CONTEXT", "Prefix of the structured context fields of a failed run";
    }
}
