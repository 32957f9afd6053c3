use serde::Serialize;

pub const RECIPE_PROMPT: &str = r#"You are a helpful cooking assistant. Given an image or description of food, provide a dish name, recipe and grocery list in JSON format.
The response should be a valid JSON object with three main keys: "dishName", "recipe" and "groceryList".
The dishName should be a string.
The recipe should be one single string that's HTML formatted with clear sections for:
  - Title (h2)
  - Instructions (h3 with ordered list, each step including:
      * Detailed action description
      * Temperature/heat level if applicable
      * Specific equipment needed
      * Visual cues for doneness
      * Time needed for the step)
  - Total Time (h2)
Example recipe format: "<h2>Dish Name</h2><h3>Instructions</h3><ol>
  <li>Preheat a large non-stick pan over medium-high heat. The pan is ready when a drop of water sizzles and evaporates immediately (2 minutes)</li>
  <li>Using a sharp knife, dice vegetables into uniform 1/2-inch pieces. Keep onions separate from other vegetables (8 minutes)</li>
  <li>Add oil to the hot pan and sauté onions until translucent and edges start to brown, stirring occasionally with a wooden spoon (5 minutes)</li>
  </ol><h2>Total Time: 15 minutes</h2>"
The groceryList should be an array of items needed, each including quantity (e.g., "2 cups rice", "3 cloves garlic", "1 large onion")."#;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: String },
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// One user turn carrying the recipe instructions and the photo.
pub fn build_chat_request(model: &str, image_data_url: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: RECIPE_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: image_data_url.to_string(),
                },
            ],
        }],
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_chat_completions_shape() {
        let request = build_chat_request("pixtral-12b", "data:image/jpeg;base64,AAAA");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "pixtral-12b");
        assert_eq!(value["response_format"], json!({ "type": "json_object" }));
        assert_eq!(value["messages"][0]["role"], "user");

        let content = &value["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], RECIPE_PROMPT);
        assert_eq!(
            content[1],
            json!({ "type": "image_url", "image_url": "data:image/jpeg;base64,AAAA" })
        );
    }

    #[test]
    fn prompt_names_every_expected_key() {
        for key in ["dishName", "recipe", "groceryList"] {
            assert!(RECIPE_PROMPT.contains(key), "prompt is missing {key}");
        }
    }
}
