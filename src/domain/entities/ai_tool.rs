use serde::{Deserialize, Serialize};

/// Instruction placed ahead of the user's prompt for the code tool.
pub const CODE_INSTRUCTION: &str = "You are a code generator. You must answer only in markdown code snippets. Use code comments for explanations.";

pub const MAX_IMAGE_AMOUNT: u8 = 5;

/// The five dashboard tools. Every one of them is metered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiTool {
    Conversation,
    Code,
    Image,
    Video,
    Music,
}

impl AiTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiTool::Conversation => "conversation",
            AiTool::Code => "code",
            AiTool::Image => "image",
            AiTool::Video => "video",
            AiTool::Music => "music",
        }
    }
}

/// Tools whose output is a list of hosted asset URLs rather than text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Music,
}

impl MediaKind {
    pub fn tool(&self) -> AiTool {
        match self {
            MediaKind::Image => AiTool::Image,
            MediaKind::Video => AiTool::Video,
            MediaKind::Music => AiTool::Music,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageResolution {
    Small,
    #[default]
    Medium,
    Large,
}

impl ImageResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResolution::Small => "256x256",
            ImageResolution::Medium => "512x512",
            ImageResolution::Large => "1024x1024",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "256x256" => Some(ImageResolution::Small),
            "512x512" => Some(ImageResolution::Medium),
            "1024x1024" => Some(ImageResolution::Large),
            _ => None,
        }
    }

    /// Edge length in pixels (all supported resolutions are square).
    pub fn pixels(&self) -> u32 {
        match self {
            ImageResolution::Small => 256,
            ImageResolution::Medium => 512,
            ImageResolution::Large => 1024,
        }
    }
}
