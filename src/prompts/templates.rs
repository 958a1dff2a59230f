/// Replace `{key}` placeholders with their values in one left-to-right pass.
/// Substituted text is never scanned again, and unknown placeholders stay as-is.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                rendered.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// Every instruction sent upstream. Callers can swap any of them; the
/// placeholders each one understands are listed on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    /// `{prompt}`, `{setting}`
    pub monument_from_text: String,
    /// `{setting}`
    pub monument_from_reference: String,
    pub isolated_setting: String,
    pub contextual_setting: String,
    pub describe_scene: String,
    /// `{monument_description}`, `{scene_description}`
    pub synthesize_prompt: String,
    /// `{monument_description}`, `{scene_description}`
    pub fallback_composite: String,
    /// `{notes}`
    pub composite_preserve: String,
    /// `{notes}`
    pub composite_inspire: String,
    /// `{scene}`
    pub composite_text_scene: String,
    /// `{notes}`
    pub composite_notes: String,
    pub reference_composite: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            monument_from_text: MONUMENT_FROM_TEXT.to_string(),
            monument_from_reference: MONUMENT_FROM_REFERENCE.to_string(),
            isolated_setting: ISOLATED_SETTING.to_string(),
            contextual_setting: CONTEXTUAL_SETTING.to_string(),
            describe_scene: DESCRIBE_SCENE.to_string(),
            synthesize_prompt: SYNTHESIZE_PROMPT.to_string(),
            fallback_composite: FALLBACK_COMPOSITE.to_string(),
            composite_preserve: COMPOSITE_PRESERVE.to_string(),
            composite_inspire: COMPOSITE_INSPIRE.to_string(),
            composite_text_scene: COMPOSITE_TEXT_SCENE.to_string(),
            composite_notes: COMPOSITE_NOTES.to_string(),
            reference_composite: REFERENCE_COMPOSITE.to_string(),
        }
    }
}

const MONUMENT_FROM_TEXT: &str = "\
TASK: Create a detailed, photorealistic image of a monument: {prompt}.

MONUMENT:
- Render it as a real, built sculpture that is grand and impressive.
- Material: bronze, marble, stone, or metal.
- Style: detailed and realistic. Avoid cartoon or stylized effects.

{setting}

DESCRIPTION:
- Alongside the image, reply with a 1-2 sentence text description of the monument you created: its subject, material, pose, and notable details.";

const MONUMENT_FROM_REFERENCE: &str = "\
TASK: Create a monument statue based on the subject of this image.

SUBJECT:
- Study the image and identify whether its subject is a person, an animal, or an object.
- For a person, capture facial features, pose, gesture, and clothing details.
- For an animal or an object, capture its shape and key design elements.
- Create a statue that replicates the subject faithfully as a monument.

MONUMENT:
- Material: bronze, marble, stone, or metal.
- Style: detailed and realistic. Avoid cartoon or stylized effects.

{setting}

DESCRIPTION:
- Alongside the image, reply with a 1-2 sentence text description of the monument you created: the subject category, material, pose, and notable details.";

const ISOLATED_SETTING: &str = "\
SETTING:
- Show the monument isolated as a single subject on a plain, neutral background.
- No surrounding scenery, buildings, people, or ground details beyond the pedestal.";

const CONTEXTUAL_SETTING: &str = "\
SETTING:
- Place the monument in an appropriate setting that suits its subject.";

const DESCRIBE_SCENE: &str = "\
Describe this scene in detail for the purpose of placing a monument in it. Include information about: the location type (park, plaza, street, city, nature, etc.), lighting conditions (sunny, cloudy, evening, etc.), weather, surrounding elements (buildings, trees, people, vehicles, etc.), ground surface (grass, pavement, sand, etc.), and overall atmosphere. Keep the description concise but detailed, around 2-3 sentences.";

const SYNTHESIZE_PROMPT: &str = "\
You are writing a prompt for an image generation model. Write a single paragraph that describes the monument below standing in the scene below as its focal point. The monument must rest firmly on the ground, and its lighting, shadows, and perspective must match the scene.

MONUMENT: {monument_description}

SCENE: {scene_description}

Respond with the paragraph only.";

const FALLBACK_COMPOSITE: &str = "\
A photorealistic photograph of {monument_description} standing in {scene_description}. The monument is the focal point, rests firmly on the ground, and its lighting, shadows, and perspective match the scene.";

const COMPOSITE_PRESERVE: &str = "\
TASK: Add a monument to an existing photograph.

INPUT:
- FIRST IMAGE: the monument to place.
- SECOND IMAGE: the background photograph. It is authoritative.

SCENE PRESERVATION (MOST IMPORTANT):
- Keep the SECOND IMAGE pixel-for-pixel identical except where the monument, its base, and its shadow fall.
- Do NOT change, crop, or recompose the background.
- Do NOT reframe, zoom, re-light, or recolor the scene independently of the monument.
- Do NOT remove, replace, or invent any element of the scene (no plaques, crowds, text, or banners).
- ONLY ADD the monument and its grounding shadow.

PLACEMENT:
- The monument must take up NO MORE THAN ~30-40% of the frame.
- Its base must rest firmly on a ground plane visible in the SECOND IMAGE. It must never float.
- Cast a shadow consistent with the existing light direction of the SECOND IMAGE.
- Match perspective, scale, and lighting to the SECOND IMAGE.
{notes}
OUTPUT: ONE photorealistic image showing the full original scene with the monument added.";

const COMPOSITE_INSPIRE: &str = "\
TASK: Create a photograph of a monument in a setting.

INPUT:
- FIRST IMAGE: the monument to place.
- SECOND IMAGE: loose inspiration for the setting. You may adapt its framing and composition.

PLACEMENT:
- The monument is the focal point but takes up NO MORE THAN ~30-40% of the frame.
- Its base must rest firmly on the ground. It must never float.
- Cast shadows consistent with the light direction of the setting.
- Match perspective, scale, and lighting so the monument looks built in place.
{notes}
OUTPUT: ONE photorealistic image.";

const COMPOSITE_TEXT_SCENE: &str = "\
TASK: Create a photograph of the monument from the FIRST IMAGE standing in the scene described below.

SCENE: {scene}

PLACEMENT:
- The monument is the focal point but takes up NO MORE THAN ~30-40% of the frame.
- Its base must rest firmly on the ground. It must never float.
- Cast shadows consistent with the light direction of the scene.
- Keep the monument's material, pose, and details as shown in the FIRST IMAGE.

OUTPUT: ONE photorealistic image.";

const COMPOSITE_NOTES: &str = "
MONUMENT AND SCENE NOTES:
{notes}
";

const REFERENCE_COMPOSITE: &str = "\
TASK: Create a monument composite image.

INPUT:
- FIRST IMAGE: reference for the monument (what the monument should depict).
- SECOND IMAGE: the scene where the monument is placed. It is authoritative.

MONUMENT CREATION:
- Study the FIRST IMAGE and identify whether its subject is a person, an animal, or an object.
- Create a statue of that subject, keeping its identity, pose, and key details.
- Material: bronze, marble, stone, or metal. Detailed and realistic.

SCENE PRESERVATION (MOST IMPORTANT):
- Keep the SECOND IMAGE pixel-for-pixel identical except where the monument, its base, and its shadow fall.
- Do NOT change, crop, or recompose the background.
- Do NOT reframe, zoom, re-light, or recolor the scene.
- ONLY ADD the monument and its grounding shadow.

PLACEMENT:
- The monument must take up NO MORE THAN ~30-40% of the frame.
- Its base must rest firmly on the ground in the SECOND IMAGE. It must never float.
- Cast a shadow consistent with the existing light direction.

OUTPUT: ONE photorealistic image showing the full original scene with the monument added.";
