diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    collections (id) {
        id -> Uuid,
        owner_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        embedding_model -> Text,
        embedding_dimension -> Int4,
        chunk_size -> Int4,
        chunk_overlap -> Int4,
        max_retrieval_count -> Int4,
        created_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    documents (id) {
        id -> Uuid,
        collection_id -> Uuid,
        title -> Text,
        source_text -> Text,
        content_type -> Text,
        content_hash -> Text,
        processing_status -> Varchar,
        status_reason -> Nullable<Text>,
        chunk_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    chunks (id) {
        id -> Uuid,
        document_id -> Uuid,
        ordinal -> Int4,
        chunk_text -> Text,
        embedding -> Vector,
        embedding_model -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    sessions (id) {
        id -> Uuid,
        collection_id -> Uuid,
        title -> Text,
        model -> Text,
        context_window -> Int4,
        temperature -> Float4,
        max_retrieval_count -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    messages (id) {
        id -> Uuid,
        session_id -> Uuid,
        seq -> Int8,
        role -> Varchar,
        content -> Text,
        sources -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(documents -> collections (collection_id));
diesel::joinable!(chunks -> documents (document_id));
diesel::joinable!(sessions -> collections (collection_id));
diesel::joinable!(messages -> sessions (session_id));

diesel::allow_tables_to_appear_in_same_query!(collections, documents, chunks, sessions, messages,);
