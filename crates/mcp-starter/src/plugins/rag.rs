//! RAG (Retrieval-Augmented Generation) template

use serde_json::Value;

use super::mcp::{LICENSES, PYTHON_VERSIONS};
use super::{context_from, BASE_DEPENDENCIES};
use crate::context::{self, Context};
use crate::plugin::{derive_slug, extend_unique, Choice, PluginInfo, TemplatePlugin};

const INFO: PluginInfo = PluginInfo {
    name: "rag",
    description: "RAG-enabled MCP server with vector databases and retrieval tools",
    version: "1.0.0",
};

const VECTOR_DBS: &[&str] = &["chroma", "pinecone", "weaviate", "qdrant", "faiss"];
const EMBEDDING_MODELS: &[&str] = &["sentence-transformers", "openai", "cohere"];
const CHUNK_STRATEGIES: &[&str] = &["recursive", "semantic", "fixed"];

const CHOICES: &[Choice] = &[
    Choice {
        field: "vector_db",
        options: VECTOR_DBS,
        required: true,
    },
    Choice {
        field: "embedding_model",
        options: EMBEDDING_MODELS,
        required: true,
    },
    Choice {
        field: "chunk_strategy",
        options: CHUNK_STRATEGIES,
        required: false,
    },
    Choice {
        field: "license",
        options: LICENSES,
        required: false,
    },
    Choice {
        field: "python_version",
        options: PYTHON_VERSIONS,
        required: false,
    },
];

/// MCP server template with vector search and document ingestion
#[derive(Debug, Default)]
pub struct RagTemplatePlugin;

impl RagTemplatePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl TemplatePlugin for RagTemplatePlugin {
    fn info(&self) -> &PluginInfo {
        &INFO
    }

    fn default_context(&self) -> Context {
        context_from(&[
            ("project_name", "My RAG MCP Server"),
            ("project_slug", "my_rag_mcp_server"),
            (
                "project_description",
                "A RAG-enabled Model Context Protocol server with vector search capabilities",
            ),
            ("author_name", "Your Name"),
            ("author_email", "your.email@example.com"),
            ("github_username", "yourusername"),
            ("version", "0.1.0"),
            ("python_version", "3.11"),
            ("use_docker", "y"),
            ("use_github_actions", "y"),
            ("use_pre_commit", "y"),
            ("license", "MIT"),
            ("include_examples", "y"),
            ("vector_db", "chroma"),
            ("embedding_model", "sentence-transformers"),
            ("document_loaders", "y"),
            ("web_scraping", "y"),
            ("pdf_processing", "y"),
            ("chunk_strategy", "recursive"),
            ("include_reranker", "y"),
        ])
    }

    fn supported_features(&self) -> Vec<&'static str> {
        vec![
            "docker",
            "github_actions",
            "pre_commit",
            "testing",
            "documentation",
            "multiple_licenses",
            "vector_databases",
            "embedding_models",
            "document_loaders",
            "web_scraping",
            "pdf_processing",
            "text_chunking",
            "semantic_search",
            "reranking",
            "examples",
        ]
    }

    fn choices(&self) -> &[Choice] {
        CHOICES
    }

    fn pre_generate_hook(&self, mut context: Context) -> Context {
        derive_slug(&mut context);

        let mut dependencies = BASE_DEPENDENCIES.to_vec();

        let vector_db: &[&str] = match context::get_str(&context, "vector_db").unwrap_or("chroma") {
            "chroma" => &["chromadb", "sqlite3"],
            "pinecone" => &["pinecone-client"],
            "weaviate" => &["weaviate-client"],
            "qdrant" => &["qdrant-client"],
            "faiss" => &["faiss-cpu", "numpy"],
            _ => &[],
        };
        extend_unique(&mut dependencies, vector_db);

        let embedding: &[&str] = match context::get_str(&context, "embedding_model")
            .unwrap_or("sentence-transformers")
        {
            "sentence-transformers" => &["sentence-transformers"],
            "openai" => &["openai"],
            "cohere" => &["cohere"],
            _ => &[],
        };
        extend_unique(&mut dependencies, embedding);

        if context::is_enabled(&context, "pdf_processing") {
            extend_unique(&mut dependencies, &["pypdf2", "pdfplumber"]);
        }
        if context::is_enabled(&context, "web_scraping") {
            extend_unique(&mut dependencies, &["requests", "beautifulsoup4", "scrapy"]);
        }
        if context::is_enabled(&context, "document_loaders") {
            extend_unique(&mut dependencies, &["python-docx", "openpyxl"]);
        }
        if context::is_enabled(&context, "include_reranker") {
            // Cross-encoder models
            extend_unique(&mut dependencies, &["sentence-transformers"]);
        }

        context.insert(
            "_computed_dependencies".to_string(),
            Value::from(dependencies),
        );
        context
    }

    fn next_steps(&self, context: &Context) -> Vec<String> {
        let slug = context::get_str(context, "project_slug").unwrap_or("server");
        vec![
            "pip install -e .".to_string(),
            format!("python -m {}.ingest ./documents", slug),
            format!("python -m {}.server", slug),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use serde_json::json;

    fn ctx(value: Value) -> Context {
        value.as_object().cloned().unwrap()
    }

    fn deps(context: &Context) -> Vec<&str> {
        context["_computed_dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    fn rag_context(vector_db: &str, embedding_model: &str) -> Context {
        ctx(json!({
            "project_name": "Test RAG Project",
            "author_name": "Test Author",
            "author_email": "test@example.com",
            "vector_db": vector_db,
            "embedding_model": embedding_model,
        }))
    }

    #[test]
    fn test_plugin_properties() {
        let plugin = RagTemplatePlugin::new();
        assert_eq!(plugin.name(), "rag");
        assert!(plugin.description().contains("RAG"));
        assert_eq!(plugin.version(), "1.0.0");
    }

    #[test]
    fn test_template_path() {
        let path = RagTemplatePlugin::new().template_path();
        assert!(path.exists());
        assert!(path.join("cookiecutter.json").exists());
    }

    #[test]
    fn test_default_context() {
        let context = RagTemplatePlugin::new().default_context();
        for field in ["vector_db", "embedding_model", "chunk_strategy"] {
            assert!(context::is_truthy(&context, field), "{} should be set", field);
        }
    }

    #[test]
    fn test_supported_features() {
        let features = RagTemplatePlugin::new().supported_features();
        for feature in ["vector_databases", "embedding_models", "semantic_search"] {
            assert!(features.contains(&feature));
        }
    }

    #[test]
    fn test_validate_context() {
        let plugin = RagTemplatePlugin::new();

        assert!(plugin
            .validate_context(&rag_context("chroma", "sentence-transformers"))
            .is_ok());
        assert!(plugin
            .validate_context(&rag_context("faiss", "sentence-transformers"))
            .is_ok());
        assert!(plugin
            .validate_context(&rag_context("invalid_db", "sentence-transformers"))
            .is_err());
        assert!(plugin
            .validate_context(&rag_context("chroma", "invalid_model"))
            .is_err());
    }

    #[test]
    fn test_vector_db_is_required() {
        let plugin = RagTemplatePlugin::new();
        let mut context = rag_context("chroma", "openai");
        context.remove("vector_db");

        let err = plugin.validate_context(&context).unwrap_err();
        assert_eq!(err, ContextError::MissingField("vector_db".to_string()));
        assert_eq!(err.to_string(), "missing required field 'vector_db'");
    }

    #[test]
    fn test_validate_chunk_strategy() {
        let plugin = RagTemplatePlugin::new();
        let mut context = rag_context("qdrant", "cohere");
        context.insert("chunk_strategy".to_string(), json!("sentences"));
        assert!(plugin.validate_context(&context).is_err());

        context.insert("chunk_strategy".to_string(), json!("semantic"));
        assert!(plugin.validate_context(&context).is_ok());
    }

    #[test]
    fn test_pre_generate_hook_dependencies() {
        let plugin = RagTemplatePlugin::new();
        let chroma = plugin.pre_generate_hook(ctx(json!({
            "project_name": "Test RAG Project",
            "vector_db": "chroma",
            "embedding_model": "sentence-transformers",
            "pdf_processing": "y",
            "web_scraping": "y",
        })));

        let dependencies = deps(&chroma);
        for dep in ["fastmcp", "pydantic", "chromadb", "sentence-transformers", "pypdf2", "requests"] {
            assert!(dependencies.contains(&dep), "missing {}", dep);
        }
        assert!(!dependencies.contains(&"python-docx"));
        assert_eq!(chroma["project_slug"], "test_rag_project");

        let faiss = plugin.pre_generate_hook(ctx(json!({
            "project_name": "Test RAG Project",
            "vector_db": "faiss",
            "embedding_model": "sentence-transformers",
        })));
        let dependencies = deps(&faiss);
        for dep in ["fastmcp", "pydantic", "faiss-cpu", "numpy", "sentence-transformers"] {
            assert!(dependencies.contains(&dep), "missing {}", dep);
        }
        assert!(!dependencies.contains(&"chromadb"));
    }

    #[test]
    fn test_dependencies_are_unique() {
        let plugin = RagTemplatePlugin::new();
        let context = plugin.pre_generate_hook(plugin.default_context());
        let dependencies = deps(&context);

        let count = dependencies
            .iter()
            .filter(|d| **d == "sentence-transformers")
            .count();
        assert_eq!(count, 1);
        assert_eq!(&dependencies[..4], BASE_DEPENDENCIES);
    }

    #[test]
    fn test_missing_choices_fall_back_to_defaults() {
        let context = RagTemplatePlugin::new().pre_generate_hook(Context::new());
        let dependencies = deps(&context);
        assert!(dependencies.contains(&"chromadb"));
        assert!(dependencies.contains(&"sentence-transformers"));
        assert!(!context.contains_key("project_slug"));
    }

    #[test]
    fn test_end_to_end_defaults() {
        let plugin = RagTemplatePlugin::new();
        let context = plugin.default_context();
        assert!(plugin.validate_context(&context).is_ok());

        let context = plugin.pre_generate_hook(context);
        assert!(context.contains_key("_computed_dependencies"));
        assert_eq!(context["project_slug"], "my_rag_mcp_server");
    }
}
