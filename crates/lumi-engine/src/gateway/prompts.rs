use lumi_contracts::catalog::{Catalog, Category, Product};
use lumi_contracts::media::InlineImage;
use serde_json::{json, Value};

use super::FitCheckRequest;
use crate::transport::{Content, GenerateRequest, ImageSize, Part};

pub(crate) const PORTRAIT_ASPECT: &str = "3:4";

const STYLIST_FILTER_INSTRUCTION: &str = "You are an elite AI stylist. Analyze photos with precision and recommend fashion that enhances the user's natural features. Return ONLY a valid JSON array of strings (the IDs).";
const CURATOR_INSTRUCTION: &str =
    "You are an expert fashion curator. Your tone is sophisticated and professional.";
const EDITOR_INSTRUCTION: &str = "You are a senior fashion editor at Vogue. Your advice is minimal, luxury-focused, and trend-aware.";

fn single_turn(model: &str, parts: Vec<Part>) -> GenerateRequest {
    GenerateRequest::new(model, vec![Content::user(parts)])
}

pub(crate) fn id_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
    })
}

pub(crate) fn stylist_reply_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" },
            "suggestedProductIds": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
            },
        },
        "required": ["text", "suggestedProductIds"],
    })
}

pub(crate) fn recommend(
    model: &str,
    photo: &InlineImage,
    category: Category,
    products: &[Product],
) -> GenerateRequest {
    let listing = products
        .iter()
        .map(|product| {
            format!(
                "ID: {}, Name: {}, Description: {}",
                product.id, product.name, product.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Analyze the person in this photo. Out of the following products in the category \"{category}\", identify which ones would look best on them based on their body type, skin tone, and apparent style. Return the IDs of the recommended products as a JSON list.\n\nProducts:\n{listing}"
    );
    single_turn(
        model,
        vec![Part::Image(photo.clone()), Part::Text(prompt)],
    )
    .with_system_instruction(STYLIST_FILTER_INSTRUCTION)
    .with_json_schema(id_list_schema())
}

pub(crate) fn analyze(model: &str, image: &InlineImage) -> GenerateRequest {
    single_turn(
        model,
        vec![
            Part::Image(image.clone()),
            Part::Text(
                "Analyze this fashion item or outfit. Identify the style, fabric type, and suggest how to style it with minimalist luxury pieces. Keep it concise."
                    .to_string(),
            ),
        ],
    )
    .with_system_instruction(CURATOR_INSTRUCTION)
}

pub(crate) fn grounded_advice(model: &str, query: &str) -> GenerateRequest {
    single_turn(
        model,
        vec![Part::Text(format!(
            "Provide the latest fashion trends and specific advice for: {query}. Include real-world references if possible."
        ))],
    )
    .with_google_search()
}

pub(crate) fn studio_image(model: &str, prompt: &str, size: ImageSize) -> GenerateRequest {
    single_turn(
        model,
        vec![Part::Text(format!(
            "A high-end luxury fashion product shot. {prompt}. Minimalist studio background, soft lighting, 8k resolution, professional photography."
        ))],
    )
    .with_image_config(PORTRAIT_ASPECT, Some(size))
}

pub(crate) fn edit_image(
    model: &str,
    image: &InlineImage,
    instruction: &str,
    size: ImageSize,
) -> GenerateRequest {
    single_turn(
        model,
        vec![
            Part::Image(image.clone()),
            Part::Text(format!(
                "Edit this fashion photo: {instruction}. Maintain the high-end luxury aesthetic."
            )),
        ],
    )
    .with_image_config(PORTRAIT_ASPECT, Some(size))
}

pub(crate) fn fashion_advice(model: &str, occasion: &str) -> GenerateRequest {
    single_turn(
        model,
        vec![Part::Text(format!(
            "Suggest a fashion style and key pieces for a {occasion}. Give a short, stylish summary."
        ))],
    )
    .with_system_instruction(EDITOR_INSTRUCTION)
    .with_temperature(0.7)
}

/// The user photo, when present, is always the first image part.
pub(crate) fn fit_check(model: &str, request: &FitCheckRequest) -> GenerateRequest {
    let color = request
        .color
        .as_deref()
        .map(|color| format!(" in color {color}"))
        .unwrap_or_default();
    let pose = format!(
        "The person is standing and showing the {} side view.",
        request.pose
    );
    let mut parts = Vec::new();
    let prompt = if let Some(user_photo) = request.user_photo.as_ref() {
        parts.push(Part::Image(user_photo.clone()));
        format!(
            "A high-end, professional fashion photograph. The exact person from the first image is now wearing the garment shown in the second image. The garment is a {}{color}. {pose} Replicate texture precisely. Solid clean white background.",
            request.product_name
        )
    } else {
        format!(
            "A high-end fashion e-commerce photo of a model wearing the {}{color}. {pose} Replicate fit and design. Clean white background.",
            request.product_name
        )
    };
    if let Some(product_image) = request.product_image.as_ref() {
        parts.push(Part::Image(product_image.clone()));
    }
    parts.push(Part::Text(prompt));
    single_turn(model, parts).with_image_config(PORTRAIT_ASPECT, None)
}

pub(crate) fn stylist_instruction(catalog: &Catalog) -> String {
    format!(
        "You are Lumi, a luxury fashion consultant. Inventory:\n{}\nSuggest 1-3 items as JSON: {{ 'text': string, 'suggestedProductIds': string[] }}. Use sophisticated tone.",
        catalog.inventory_listing()
    )
}

#[cfg(test)]
mod tests {
    use lumi_contracts::catalog::{Catalog, Category};
    use lumi_contracts::media::InlineImage;

    use super::{fit_check, recommend, stylist_instruction};
    use crate::gateway::{FitCheckRequest, Pose};
    use crate::transport::Part;

    fn image(tag: &str) -> InlineImage {
        InlineImage::new("image/jpeg", tag)
    }

    #[test]
    fn recommend_lists_only_given_products_after_the_photo() {
        let catalog = Catalog::mock();
        let hoodies = catalog.in_category(Category::Hoodie);
        let request = recommend("m", &image("me"), Category::Hoodie, &hoodies);

        let parts = &request.contents[0].parts;
        assert_eq!(parts[0], Part::Image(image("me")));
        let prompt = request.prompt_text();
        assert!(prompt.contains("in the category \"Hoodie\""));
        assert!(prompt.contains("ID: h1, Name: Monolith Studio Hoodie"));
        assert!(!prompt.contains("ID: s1"));
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn fit_check_with_user_photo_puts_person_first() {
        let request = fit_check(
            "m",
            &FitCheckRequest {
                product_name: "Monolith Studio Hoodie".to_string(),
                product_image: Some(image("garment")),
                user_photo: Some(image("person")),
                color: Some("#708090".to_string()),
                pose: Pose::Left,
            },
        );
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Part::Image(image("person")));
        assert_eq!(parts[1], Part::Image(image("garment")));
        let prompt = request.prompt_text();
        assert!(prompt.contains("The exact person from the first image"));
        assert!(prompt.contains("Monolith Studio Hoodie in color #708090"));
        assert!(prompt.contains("showing the Left side view"));
        assert_eq!(
            request.image_config.as_ref().map(|c| c.aspect_ratio.as_str()),
            Some("3:4")
        );
    }

    #[test]
    fn fit_check_without_photos_describes_a_model() {
        let request = fit_check(
            "m",
            &FitCheckRequest {
                product_name: "Tee".to_string(),
                product_image: None,
                user_photo: None,
                color: None,
                pose: Pose::Front,
            },
        );
        assert_eq!(request.contents[0].parts.len(), 1);
        let prompt = request.prompt_text();
        assert!(prompt.starts_with("A high-end fashion e-commerce photo of a model wearing the Tee."));
    }

    #[test]
    fn stylist_instruction_embeds_inventory() {
        let instruction = stylist_instruction(&Catalog::mock());
        assert!(instruction.starts_with("You are Lumi"));
        assert!(instruction.contains("- ID: j1, Name: Modern Architecture Blazer"));
        assert!(instruction.contains("'suggestedProductIds': string[]"));
    }
}
