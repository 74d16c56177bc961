// prompts.rs

/// Asks the model to pick one topic from a numbered listing, in a fixed
/// "Number: X | Reason: ..." reply format the selector can scan for.
pub fn selection_prompt(topics_summary: &[String]) -> String {
    format!(
        "Analyze these trending topics and select the BEST ONE for a tech blog post that would:
1. Be most engaging for readers
2. Have good SEO potential
3. Be trending and relevant
4. Appeal to tech professionals and enthusiasts

Topics:
{}

Respond with ONLY the number of your choice (1-{}) and a brief reason why.
Format: \"Number: X | Reason: Brief explanation\"",
        topics_summary.join("\n"),
        topics_summary.len()
    )
}

pub fn article_prompt(topic_title: &str, topic_content: &str) -> String {
    format!(
        "Create a comprehensive, SEO-optimized blog post based on this topic:

Title: {}
Content Summary: {}

Requirements:
1. Create an engaging, SEO-friendly title (50-60 characters)
2. Write a meta description (150-160 characters)
3. Include relevant keywords naturally
4. Structure with proper headings (H1, H2, H3)
5. Write 1200-1500 words
6. Include actionable insights
7. Add a compelling conclusion with call-to-action

Format your response as:
TITLE: [SEO Title]
META_DESCRIPTION: [Meta description]
KEYWORDS: [comma-separated keywords]

[Full blog content with proper markdown formatting]",
        topic_title, topic_content
    )
}

pub fn social_post_prompt(blog_title: &str, topic_title: &str) -> String {
    format!(
        "Create an engaging LinkedIn post based on this blog topic:

Blog Title: {}
Topic: {}

Requirements:
1. Professional tone suitable for LinkedIn
2. 150-200 words
3. Include relevant hashtags (5-10)
4. Engaging hook in first line
5. Call-to-action at the end
6. Use emojis sparingly but effectively

Format as a ready-to-post LinkedIn update.",
        blog_title, topic_title
    )
}

pub fn image_prompt_request(blog_title: &str, topic_title: &str) -> String {
    format!(
        "Create a detailed image generation prompt for this blog post:

Title: {}
Topic: {}

Create a prompt for generating a professional, modern image that would work as:
1. Blog header image
2. Social media post image
3. Should be tech-focused and professional
4. Include relevant visual elements

Provide ONLY the image generation prompt, nothing else.",
        blog_title, topic_title
    )
}

/// Deterministic fallback used when image-prompt generation fails.
pub fn fallback_image_prompt(blog_title: &str) -> String {
    format!(
        "Professional tech illustration about {}, modern digital art style, clean and minimalist",
        blog_title
    )
}
