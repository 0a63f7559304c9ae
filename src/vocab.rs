//! IRI constants for the vocabularies the crosswalk emits.
//!
//! Each vocabulary is a module of `&'static str` constants built from its
//! namespace, so `vivo::ORCID_ID` reads the same way the term appears in the
//! VIVO ontology.

macro_rules! vocabulary {
    ($(#[$meta:meta])* $module:ident = $ns:literal { $($name:ident = $local:literal),* $(,)? }) => {
        $(#[$meta])*
        pub mod $module {
            pub const NS: &str = $ns;
            $(pub const $name: &str = concat!($ns, $local);)*
        }
    };
}

vocabulary!(
    /// RDF core.
    rdf = "http://www.w3.org/1999/02/22-rdf-syntax-ns#" {
        TYPE = "type",
    }
);

vocabulary!(
    rdfs = "http://www.w3.org/2000/01/rdf-schema#" {
        LABEL = "label",
    }
);

vocabulary!(
    xsd = "http://www.w3.org/2001/XMLSchema#" {
        DATE_TIME = "dateTime",
        ANY_URI = "anyURI",
        STRING = "string",
    }
);

vocabulary!(
    owl = "http://www.w3.org/2002/07/owl#" {
        THING = "Thing",
    }
);

vocabulary!(
    /// VIVO core ontology.
    vivo = "http://vivoweb.org/ontology/core#" {
        // Classes
        ABSTRACT = "Abstract",
        ACADEMIC_DEGREE = "AcademicDegree",
        AUTHORSHIP = "Authorship",
        AWARDED_DEGREE = "AwardedDegree",
        CONFERENCE_PAPER = "ConferencePaper",
        CONFERENCE_POSTER = "ConferencePoster",
        DATASET = "Dataset",
        DATE_TIME_INTERVAL = "DateTimeInterval",
        DATE_TIME_VALUE = "DateTimeValue",
        EDITORSHIP = "Editorship",
        EDUCATIONAL_PROCESS = "EducationalProcess",
        GEOGRAPHIC_LOCATION = "GeographicLocation",
        GRANT = "Grant",
        NEWSLETTER = "Newsletter",
        PRINCIPAL_INVESTIGATOR_ROLE = "PrincipalInvestigatorRole",
        SPEECH = "Speech",
        WORKING_PAPER = "WorkingPaper",
        YEAR_PRECISION = "yearPrecision",
        YEAR_MONTH_PRECISION = "yearMonthPrecision",
        YEAR_MONTH_DAY_PRECISION = "yearMonthDayPrecision",
        // Properties
        ASSIGNED_BY = "assignedBy",
        ASSIGNEE_FOR = "assigneeFor",
        CONFIRMED_ORCID_ID = "confirmedOrcidId",
        DATE_TIME = "dateTime",
        DATE_TIME_INTERVAL_PROP = "dateTimeInterval",
        DATE_TIME_PRECISION = "dateTimePrecision",
        DATE_TIME_VALUE_PROP = "dateTimeValue",
        DEPARTMENT_OR_SCHOOL = "departmentOrSchool",
        END = "end",
        FREETEXT_KEYWORD = "freetextKeyword",
        HAS_PUBLICATION_VENUE = "hasPublicationVenue",
        HAS_SUBJECT_AREA = "hasSubjectArea",
        ORCID_ID = "orcidId",
        OVERVIEW = "overview",
        PATENT_NUMBER = "patentNumber",
        PMCID = "pmcid",
        PUBLISHER = "publisher",
        RELATED_BY = "relatedBy",
        RELATES = "relates",
        RESEARCHER_ID = "researcherId",
        SCOPUS_ID = "scopusId",
        SPONSOR_AWARD_ID = "sponsorAwardId",
        START = "start",
        TOTAL_AWARD_AMOUNT = "totalAwardAmount",
    }
);

vocabulary!(
    /// Bibliographic ontology.
    bibo = "http://purl.org/ontology/bibo/" {
        ACADEMIC_ARTICLE = "AcademicArticle",
        ARTICLE = "Article",
        BOOK = "Book",
        CHAPTER = "Chapter",
        DOCUMENT = "Document",
        DOCUMENT_PART = "DocumentPart",
        EDITED_BOOK = "EditedBook",
        ISSUE_CLASS = "Issue",
        JOURNAL = "Journal",
        MAGAZINE = "Magazine",
        MANUAL = "Manual",
        NEWSPAPER = "Newspaper",
        PATENT = "Patent",
        PERFORMANCE = "Performance",
        PROCEEDINGS = "Proceedings",
        REPORT = "Report",
        REVIEW = "Review",
        STANDARD = "Standard",
        THESIS = "Thesis",
        WEBSITE = "Website",
        ASIN = "asin",
        DOI = "doi",
        ISBN10 = "isbn10",
        ISBN13 = "isbn13",
        ISSN = "issn",
        ISSUE = "issue",
        LCCN = "lccn",
        OCLCNUM = "oclcnum",
        PAGE_END = "pageEnd",
        PAGE_START = "pageStart",
        PMID = "pmid",
        TRANSLATOR = "translator",
        VOLUME = "volume",
    }
);

vocabulary!(
    foaf = "http://xmlns.com/foaf/0.1/" {
        ORGANIZATION = "Organization",
        PERSON = "Person",
    }
);

vocabulary!(
    /// vCard 4.0 as used by VIVO for contact information.
    vcard = "http://www.w3.org/2006/vcard/ns#" {
        FAMILY_NAME = "familyName",
        GIVEN_NAME = "givenName",
        HAS_NAME = "hasName",
        HAS_URL = "hasURL",
        INDIVIDUAL = "Individual",
        KIND = "Kind",
        NAME = "Name",
        URL = "URL",
        URL_PROP = "url",
    }
);

vocabulary!(
    /// OBO relation and information-entity terms.
    obo = "http://purl.obolibrary.org/obo/" {
        ARG_2000028 = "ARG_2000028",
        ARG_2000029 = "ARG_2000029",
        BEARER_OF = "RO_0000053",
        INHERES_IN = "RO_0000052",
        HAS_PARTICIPANT = "RO_0000057",
        LOCATED_IN = "RO_0001025",
        SPECIFIED_OUTPUT_OF = "RO_0002353",
        RESEARCH_TECHNIQUE = "OBI_0000272",
    }
);

vocabulary!(
    skos = "http://www.w3.org/2004/02/skos/core#" {
        CONCEPT = "Concept",
    }
);

/// Base of ORCID iD IRIs.
pub const ORCID_BASE: &str = "http://orcid.org/";
