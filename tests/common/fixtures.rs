//! Test fixtures - reusable content constants for tests.

/// Minimal front-end project file
pub const TSCONFIG: &str = "{ \"compilerOptions\": {} }\n";

/// A button with an optional label and a click event
pub const BUTTON_MANIFEST: &str = r#"{
    "tagName": "my-button",
    "sourceFilePath": "./button.tsx",
    "properties": [
        { "name": "label", "type": "string", "optional": true }
    ],
    "events": [
        { "name": "pressed", "detail": "void" }
    ]
}
"#;

/// A card whose `item` property uses a type from `../models`
pub const CARD_MANIFEST: &str = r#"{
    "tagName": "my-card",
    "sourceFilePath": "./card.tsx",
    "properties": [
        {
            "name": "item",
            "type": "Item",
            "required": true,
            "references": { "Item": { "location": "import", "path": "../models" } }
        }
    ]
}
"#;

/// Not JSON at all
pub const BROKEN_MANIFEST: &str = "{ \"tagName\": ";
