/// Marker that separates the fixed instructions from the user's query.
/// The answer is looked for after its first occurrence.
pub const ANSWER_MARKER: &str = "Now answer this:";

/// A worked example shown to the model.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub product_information: &'static str,
    pub answer: &'static str,
}

pub const EXAMPLES: [Example; 2] = [
    Example {
        product_information: "Rosehip Marmalade, keep it cold",
        answer: r#"{"title": "Rosehip Marmalade", "description": "You should store this delicious rose marmalade in a cold place. It is an excellent flavor used in meals and desserts. Sold in grocery stores. It is in the form of 24 gr / 1 package. You can use this wonderful flavor in your meals and desserts!"}"#,
    },
    Example {
        product_information: "Blackberry jam spoils in the heat",
        answer: r#"{"title": "Blackberry Jam", "description": "Please store in a cold environment. It is recommended to be consumed for breakfast. It is very sweet. It is a traditional flavor and can be found in markets etc. You can also use it in your meals other than breakfast."}"#,
    },
];

const INSTRUCTIONS: &str = r#"You are extracting product title and description from given text and rewriting the description and enhancing it when necessary.
Always give response in the user's input language.
Always answer in the given json format. Do not use any other keywords. Do not make up anything.
The description part must be contain at least 5 sentences for each.

Json Format:
{
"title": "<title of the product>",
"description": "<description of the product>"
}"#;

/// Render the full prompt for a product query.
///
/// The query is interpolated verbatim after [`ANSWER_MARKER`]; nothing is escaped.
pub fn build_prompt(product_information: &str) -> String {
    let examples = EXAMPLES
        .iter()
        .map(|example| {
            format!(
                "Product Information: {}\nAnswer: {}",
                example.product_information, example.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{INSTRUCTIONS}\n\nExamples:\n\n{examples}\n\n{ANSWER_MARKER}\nProduct Information: {product_information}\n"
    )
}
