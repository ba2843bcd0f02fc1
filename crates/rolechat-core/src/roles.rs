//! Static catalog of AI roles and their prompt templates.

/// Icon reference for a role; the UI decides how to draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Code2,
    UserPlus,
    UserCheck,
    UserCog,
    Stethoscope,
    Film,
    BookOpen,
    Mail,
    GraduationCap,
    BrainCircuit,
}

/// A persona bundling a display name with the system prompt that constrains it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AIRole {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: Icon,
    pub system_prompt: &'static str,
}

/// A canned prompt suggested for a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
}

pub static ROLES: &[AIRole] = &[
    AIRole {
        id: "software-developer",
        name: "Software Developer",
        description: "Get help with coding, debugging, and software development",
        icon: Icon::Code2,
        system_prompt: "You are an expert software developer with extensive knowledge across multiple programming languages and frameworks. ONLY respond to questions related to software development, programming, debugging, or technical architecture. DO NOT answer any queries outside your domain such as medical, legal, or general advice.",
    },
    AIRole {
        id: "frontend-developer",
        name: "Frontend Developer",
        description: "Get help with React, Next.js, UI/UX and web frontend issues",
        icon: Icon::UserPlus,
        system_prompt: "You are an expert in frontend development using React.js, Next.js, HTML, CSS, and UI/UX design. ONLY assist with frontend development queries.",
    },
    AIRole {
        id: "backend-developer",
        name: "Backend Developer",
        description: "Get help with Express, NestJS, databases and server-side issues",
        icon: Icon::UserCheck,
        system_prompt: "You are an expert in backend development using Node.js, Express.js, NestJS, and PostgreSQL. ONLY assist with backend development queries.",
    },
    AIRole {
        id: "fullstack-developer",
        name: "Full Stack Developer",
        description: "Get help with both frontend and backend issues",
        icon: Icon::UserCog,
        system_prompt: "You are an expert in full-stack development with proficiency in the MERN and PERN stack. ONLY help with software development across the full stack.",
    },
    AIRole {
        id: "dermatologist",
        name: "चर्म रोग विशेषज्ञ (Dermatologist)",
        description: "Skin-related medical advice (general)",
        icon: Icon::Stethoscope,
        system_prompt: "You are a dermatologist offering general skin health advice. DO NOT diagnose or prescribe. Recommend seeing a real doctor when needed.",
    },
    AIRole {
        id: "orthopedic",
        name: "हड्डी रोग विशेषज्ञ (Orthopedic Doctor)",
        description: "Bones, joints, and orthopedic health info",
        icon: Icon::Stethoscope,
        system_prompt: "You are an orthopedic specialist giving general advice on bones and joint issues. DO NOT provide real diagnoses or treatment.",
    },
    AIRole {
        id: "your-ai",
        name: "Your AI Assistant",
        description: "Personal AI to track your dev progress & generate reports",
        icon: Icon::UserCog,
        system_prompt: "You are a personalized assistant helping the user track daily activity in tech, focusing on NestJS, Next.js, ReactJS, ExpressJS, PostgreSQL, and PERN/MERN stacks. You provide: - Daily summary input prompts - Polishing of user-entered points - Weekly reports in brief professional format - Suggestions for tomorrow based on today's log - Convert raw notes into structured todos.",
    },
    AIRole {
        id: "movie-expert",
        name: "Movie Expert",
        description: "Get movie recommendations and insights",
        icon: Icon::Film,
        system_prompt: "You are a knowledgeable film critic and movie expert. ONLY provide insights, analysis, and recommendations about movies, TV shows, and film industry topics. DO NOT answer questions unrelated to films or entertainment.",
    },
    AIRole {
        id: "book-advisor",
        name: "Book Advisor",
        description: "Get book recommendations and literary insights",
        icon: Icon::BookOpen,
        system_prompt: "You are a literary expert with extensive knowledge of books across all genres. ONLY respond to book-related queries including genres, authors, plots, or literary analysis. DO NOT answer non-literary questions.",
    },
    AIRole {
        id: "writing-assistant",
        name: "Writing Assistant",
        description: "Polish and improve your writing",
        icon: Icon::Mail,
        system_prompt: "You are a professional writing assistant. ONLY help users improve writing, polish documents, emails, and communication. DO NOT engage in unrelated topics such as technical, medical, or entertainment content.",
    },
    AIRole {
        id: "doctor",
        name: "Medical Advisor",
        description: "Get general medical information and health advice",
        icon: Icon::Stethoscope,
        system_prompt: "You are a medical professional providing general health information. ONLY respond to general health-related questions. DO NOT diagnose or prescribe treatments. ALWAYS recommend users consult a real doctor for medical decisions. Do not respond to queries outside the medical domain.",
    },
    AIRole {
        id: "student-mentor",
        name: "Student Mentor",
        description: "Get help with studying and academic subjects",
        icon: Icon::GraduationCap,
        system_prompt: "You are an experienced academic mentor. ONLY provide help related to studying, academic concepts, exam tips, and student guidance. DO NOT assist with non-academic or unrelated queries.",
    },
    AIRole {
        id: "ai-researcher",
        name: "AI Researcher",
        description: "Learn about AI and machine learning",
        icon: Icon::BrainCircuit,
        system_prompt: "You are an AI researcher with expertise in machine learning, neural networks, and artificial intelligence. ONLY respond to queries about AI, ML, and related technologies. DO NOT answer questions from unrelated fields like medicine, literature, or entertainment.",
    },
    AIRole {
        id: "general-assistant",
        name: "General Assistant",
        description: "Ask anything – your everyday AI helper",
        icon: Icon::Mail,
        system_prompt: "You are a helpful and knowledgeable assistant. You can answer general questions across a wide range of topics including daily life, travel, food, basic science, history, and more. Avoid giving specialized advice in areas such as medicine, law, or technical fields unless the user clearly asks.",
    },
];

pub fn find_role(id: &str) -> Option<&'static AIRole> {
    ROLES.iter().find(|role| role.id == id)
}

static DEVELOPER_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "code-review",
        name: "Code Review",
        description: "Get feedback on your code",
        prompt: "Please review this code and suggest improvements: [paste code here]",
    },
    PromptTemplate {
        id: "debug-help",
        name: "Debug Help",
        description: "Get help with debugging issues",
        prompt: "I'm getting this error: [error message]. Here's my code: [paste code here]",
    },
    PromptTemplate {
        id: "architecture",
        name: "Architecture Advice",
        description: "Get advice on software architecture",
        prompt: "I'm building [describe project]. What architecture would you recommend?",
    },
];

static PROGRESS_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "daily-summary",
        name: "Daily Dev Tracker",
        description: "Log daily coding progress or study points",
        prompt: "What did I work on today regarding NestJS, Next.js, React, PostgreSQL, or Express?",
    },
    PromptTemplate {
        id: "polish-points",
        name: "Polish Daily Points",
        description: "Polish my daily input for better presentation",
        prompt: "Polish these daily points to make them professional: [insert points]",
    },
    PromptTemplate {
        id: "weekly-report",
        name: "Weekly Report Generator",
        description: "Summarize the weeks polished dev work in a neat report",
        prompt: "Generate a weekly report from these entries: [insert all week points]",
    },
];

static MOVIE_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "movie-recommendation",
        name: "Movie Recommendations",
        description: "Get personalized movie suggestions",
        prompt: "Suggest movies based on my interests: [describe preferences]",
    },
    PromptTemplate {
        id: "movie-analysis",
        name: "Movie Analysis",
        description: "Get detailed movie analysis",
        prompt: "Analyze the themes and symbolism in [movie name]",
    },
];

static BOOK_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "book-recommendation",
        name: "Book Recommendations",
        description: "Get suggestions for books to read",
        prompt: "Recommend books similar to [favorite book or genre]",
    },
    PromptTemplate {
        id: "literary-analysis",
        name: "Literary Analysis",
        description: "Analyze plot, characters, or themes in a book",
        prompt: "Provide a literary analysis of [book name]",
    },
];

static WRITING_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "email-polishing",
        name: "Polish My Email",
        description: "Improve the clarity and tone of an email",
        prompt: "Please improve this email: [insert email]",
    },
    PromptTemplate {
        id: "grammar-check",
        name: "Grammar Check",
        description: "Correct grammar and writing style",
        prompt: "Check the grammar in this text: [insert text]",
    },
];

static MEDICAL_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "symptom-info",
        name: "Symptom Information",
        description: "Get general health information about symptoms",
        prompt: "What could be the general causes of [symptom]?",
    },
    PromptTemplate {
        id: "wellness-advice",
        name: "Wellness Advice",
        description: "General health and wellness tips",
        prompt: "How can I maintain good health and prevent common illnesses?",
    },
];

static STUDY_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "study-tips",
        name: "Study Tips",
        description: "Get tips for better studying",
        prompt: "What are the best ways to prepare for exams?",
    },
    PromptTemplate {
        id: "concept-help",
        name: "Concept Help",
        description: "Get help understanding an academic concept",
        prompt: "Can you explain this concept: [topic]?",
    },
];

static AI_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "ai-concepts",
        name: "Understand AI Concepts",
        description: "Learn about core AI/ML topics",
        prompt: "Explain how [AI concept] works",
    },
    PromptTemplate {
        id: "research-trends",
        name: "Latest Trends",
        description: "Stay updated with current research in AI",
        prompt: "What are the latest trends in AI research?",
    },
];

static GENERAL_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "general-qa",
        name: "Ask Anything",
        description: "Ask any general question",
        prompt: "I have a question: [your question here]",
    },
    PromptTemplate {
        id: "daily-help",
        name: "Daily Help",
        description: "Get help with everyday tasks or questions",
        prompt: "Can you help me with: [describe what you need help with]",
    },
];

/// Prompt suggestions for a role; empty for roles without any
pub fn templates_for(role_id: &str) -> &'static [PromptTemplate] {
    match role_id {
        "software-developer" | "frontend-developer" | "backend-developer" | "fullstack-developer" => {
            DEVELOPER_TEMPLATES
        }
        "your-ai" => PROGRESS_TEMPLATES,
        "movie-expert" => MOVIE_TEMPLATES,
        "book-advisor" => BOOK_TEMPLATES,
        "writing-assistant" => WRITING_TEMPLATES,
        "doctor" | "dermatologist" | "orthopedic" => MEDICAL_TEMPLATES,
        "student-mentor" => STUDY_TEMPLATES,
        "ai-researcher" => AI_TEMPLATES,
        "general-assistant" => GENERAL_TEMPLATES,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_role_ids_are_unique() {
        let ids: HashSet<_> = ROLES.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), ROLES.len());
        assert_eq!(ROLES.len(), 14);
    }

    #[test]
    fn test_find_role() {
        let role = find_role("movie-expert").unwrap();
        assert_eq!(role.name, "Movie Expert");
        assert_eq!(role.icon, Icon::Film);
        assert!(find_role("nope").is_none());
    }

    #[test]
    fn test_every_role_has_templates() {
        for role in ROLES {
            assert!(!templates_for(role.id).is_empty(), "no templates for {}", role.id);
        }
    }

    #[test]
    fn test_shared_templates() {
        assert_eq!(templates_for("frontend-developer"), templates_for("software-developer"));
        assert_eq!(templates_for("orthopedic")[0].id, "symptom-info");
        assert!(templates_for("unknown-role").is_empty());
    }
}
