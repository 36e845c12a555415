use crate::model::{SchemaSnapshot, Task};

/// Renders the instruction template for `task` around the snapshot's DDL.
///
/// The schema text is interpolated verbatim. A translation question is only
/// trimmed; rejecting empty questions is the caller's job.
pub fn build(task: &Task, snapshot: &SchemaSnapshot) -> String {
    match task {
        Task::ExplainSchema => explain_schema(&snapshot.schema_text),
        Task::SuggestQuestions => suggest_questions(&snapshot.schema_text),
        Task::TranslateQuestion { question } => {
            translate_question(&snapshot.schema_text, question.trim())
        }
    }
}

fn explain_schema(schema_text: &str) -> String {
    format!(
        r#"You are a database expert. Analyze the structure of the SQLite database below and explain it so that a non-specialist can follow.

<database_schema>
{schema_text}
</database_schema>

Structure the explanation as:
1. The domain or subject this database covers
2. The role of each table (two or three sentences each)
3. How the tables relate to each other (foreign keys, if any)

Be concise and clear."#
    )
}

fn suggest_questions(schema_text: &str) -> String {
    format!(
        r#"You are a data analyst. Looking at the database below, propose **5 useful, specific questions** a user could ask of it.

<database_schema>
{schema_text}
</database_schema>

Requirements:
- Each question should yield a real business insight
- At least one question must require a JOIN across tables
- At least one question must use an aggregate function (SUM, COUNT, AVG, ...)

Format:
1. question
2. question
3. question
4. question
5. question

Write only the numbers and the questions, with no extra commentary."#
    )
}

fn translate_question(schema_text: &str, question: &str) -> String {
    format!(
        r#"You are a SQLite expert. Translate the user's question into a SQL query.

<database_schema>
{schema_text}
</database_schema>

<user_question>
{question}
</user_question>

You MUST answer in exactly this format:

<reasoning>
How you interpreted the question and which tables and columns you will use
</reasoning>

<sql>
SELECT ...
FROM ...
</sql>

Rules:
- Never use tables or columns that are not in the schema
- The SQL must be a single complete, executable statement
- Use SQLite syntax"#
    )
}
