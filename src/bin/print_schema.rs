use roster_extract::adapters::schema::{roster_schema, SYSTEM_INSTRUCTION, TASK_PROMPT};

// Prints the instruction, task prompt and response schema sent with every extraction request.
fn main() -> anyhow::Result<()> {
    println!("# System instruction\n{}\n", SYSTEM_INSTRUCTION);
    println!("# Task prompt\n{}\n", TASK_PROMPT);
    println!("# Response schema\n{}", serde_json::to_string_pretty(&roster_schema())?);
    Ok(())
}
