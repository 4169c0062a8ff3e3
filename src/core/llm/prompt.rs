//! Prompt sent to the model for one turn.

/// Combine page text, search background and the user's query.
pub fn compose(page_text: &str, background: &str, query: &str) -> String {
    format!(
        "You are an assistant with access to the user's current web page.\n\
         \n\
         CURRENT PAGE CONTENT:\n\
         {page_text}\n\
         \n\
         DUCKDUCKGO INFO:\n\
         {background}\n\
         \n\
         USER QUERY:\n\
         {query}\n\
         \n\
         Please answer the user's query based on the page content provided above."
    )
}
