use std::collections::HashSet;

use crate::application::{SolvedType, TypeResolver};
use crate::domain::{FieldDeclaration, TypeOrigin};

const PLATFORM_TYPES: &[&str] = &[
    // java.lang
    "java.lang.Object",
    "java.lang.String",
    "java.lang.StringBuilder",
    "java.lang.StringBuffer",
    "java.lang.CharSequence",
    "java.lang.Class",
    "java.lang.ClassLoader",
    "java.lang.Enum",
    "java.lang.Record",
    "java.lang.System",
    "java.lang.Runtime",
    "java.lang.Thread",
    "java.lang.ThreadLocal",
    "java.lang.Runnable",
    "java.lang.Math",
    "java.lang.StrictMath",
    "java.lang.Number",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Void",
    "java.lang.Iterable",
    "java.lang.Comparable",
    "java.lang.Cloneable",
    "java.lang.AutoCloseable",
    "java.lang.Appendable",
    "java.lang.Readable",
    "java.lang.Process",
    "java.lang.ProcessBuilder",
    "java.lang.Throwable",
    "java.lang.Exception",
    "java.lang.Error",
    "java.lang.RuntimeException",
    "java.lang.IllegalArgumentException",
    "java.lang.IllegalStateException",
    "java.lang.NullPointerException",
    "java.lang.IndexOutOfBoundsException",
    "java.lang.ArrayIndexOutOfBoundsException",
    "java.lang.ClassCastException",
    "java.lang.ArithmeticException",
    "java.lang.NumberFormatException",
    "java.lang.UnsupportedOperationException",
    "java.lang.InterruptedException",
    "java.lang.CloneNotSupportedException",
    "java.lang.ClassNotFoundException",
    "java.lang.SecurityException",
    "java.lang.AssertionError",
    "java.lang.OutOfMemoryError",
    "java.lang.StackOverflowError",
    "java.lang.Override",
    "java.lang.Deprecated",
    "java.lang.SuppressWarnings",
    "java.lang.FunctionalInterface",
    "java.lang.SafeVarargs",
    // java.lang.annotation
    "java.lang.annotation.Annotation",
    "java.lang.annotation.Retention",
    "java.lang.annotation.RetentionPolicy",
    "java.lang.annotation.Target",
    "java.lang.annotation.ElementType",
    "java.lang.annotation.Documented",
    "java.lang.annotation.Inherited",
    "java.lang.annotation.Repeatable",
    // java.lang.reflect
    "java.lang.reflect.Method",
    "java.lang.reflect.Field",
    "java.lang.reflect.Constructor",
    "java.lang.reflect.Modifier",
    "java.lang.reflect.InvocationTargetException",
    // java.util
    "java.util.Collection",
    "java.util.List",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Set",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.SortedSet",
    "java.util.NavigableSet",
    "java.util.TreeSet",
    "java.util.EnumSet",
    "java.util.Map",
    "java.util.Map.Entry",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.SortedMap",
    "java.util.NavigableMap",
    "java.util.TreeMap",
    "java.util.EnumMap",
    "java.util.IdentityHashMap",
    "java.util.WeakHashMap",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayDeque",
    "java.util.PriorityQueue",
    "java.util.Stack",
    "java.util.Vector",
    "java.util.Iterator",
    "java.util.ListIterator",
    "java.util.Collections",
    "java.util.Arrays",
    "java.util.Objects",
    "java.util.Optional",
    "java.util.OptionalInt",
    "java.util.OptionalLong",
    "java.util.OptionalDouble",
    "java.util.Comparator",
    "java.util.Random",
    "java.util.UUID",
    "java.util.Date",
    "java.util.Calendar",
    "java.util.Locale",
    "java.util.Properties",
    "java.util.Scanner",
    "java.util.StringJoiner",
    "java.util.BitSet",
    "java.util.Base64",
    "java.util.Timer",
    "java.util.TimerTask",
    "java.util.NoSuchElementException",
    "java.util.ConcurrentModificationException",
    // java.util.function
    "java.util.function.Function",
    "java.util.function.BiFunction",
    "java.util.function.Supplier",
    "java.util.function.Consumer",
    "java.util.function.BiConsumer",
    "java.util.function.Predicate",
    "java.util.function.BiPredicate",
    "java.util.function.UnaryOperator",
    "java.util.function.BinaryOperator",
    "java.util.function.IntFunction",
    "java.util.function.ToIntFunction",
    "java.util.function.ToLongFunction",
    "java.util.function.ToDoubleFunction",
    "java.util.function.IntPredicate",
    "java.util.function.IntUnaryOperator",
    "java.util.function.BooleanSupplier",
    // java.util.stream
    "java.util.stream.Stream",
    "java.util.stream.IntStream",
    "java.util.stream.LongStream",
    "java.util.stream.DoubleStream",
    "java.util.stream.Collectors",
    "java.util.stream.Collector",
    "java.util.stream.StreamSupport",
    // java.util.concurrent
    "java.util.concurrent.ConcurrentHashMap",
    "java.util.concurrent.ConcurrentMap",
    "java.util.concurrent.CopyOnWriteArrayList",
    "java.util.concurrent.BlockingQueue",
    "java.util.concurrent.LinkedBlockingQueue",
    "java.util.concurrent.ArrayBlockingQueue",
    "java.util.concurrent.Executor",
    "java.util.concurrent.ExecutorService",
    "java.util.concurrent.ScheduledExecutorService",
    "java.util.concurrent.Executors",
    "java.util.concurrent.Future",
    "java.util.concurrent.CompletableFuture",
    "java.util.concurrent.CompletionStage",
    "java.util.concurrent.Callable",
    "java.util.concurrent.TimeUnit",
    "java.util.concurrent.CountDownLatch",
    "java.util.concurrent.Semaphore",
    "java.util.concurrent.ExecutionException",
    "java.util.concurrent.TimeoutException",
    "java.util.concurrent.atomic.AtomicInteger",
    "java.util.concurrent.atomic.AtomicLong",
    "java.util.concurrent.atomic.AtomicBoolean",
    "java.util.concurrent.atomic.AtomicReference",
    "java.util.concurrent.locks.Lock",
    "java.util.concurrent.locks.ReentrantLock",
    "java.util.concurrent.locks.ReadWriteLock",
    "java.util.concurrent.locks.ReentrantReadWriteLock",
    // java.util.regex
    "java.util.regex.Pattern",
    "java.util.regex.Matcher",
    // java.io
    "java.io.File",
    "java.io.InputStream",
    "java.io.OutputStream",
    "java.io.PrintStream",
    "java.io.PrintWriter",
    "java.io.Reader",
    "java.io.Writer",
    "java.io.BufferedReader",
    "java.io.BufferedWriter",
    "java.io.InputStreamReader",
    "java.io.OutputStreamWriter",
    "java.io.FileInputStream",
    "java.io.FileOutputStream",
    "java.io.FileReader",
    "java.io.FileWriter",
    "java.io.ByteArrayInputStream",
    "java.io.ByteArrayOutputStream",
    "java.io.StringReader",
    "java.io.StringWriter",
    "java.io.Closeable",
    "java.io.Serializable",
    "java.io.IOException",
    "java.io.UncheckedIOException",
    "java.io.FileNotFoundException",
    // java.nio
    "java.nio.ByteBuffer",
    "java.nio.file.Path",
    "java.nio.file.Paths",
    "java.nio.file.Files",
    "java.nio.file.StandardOpenOption",
    "java.nio.charset.Charset",
    "java.nio.charset.StandardCharsets",
    // java.math
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.math.RoundingMode",
    // java.time
    "java.time.Instant",
    "java.time.Duration",
    "java.time.Period",
    "java.time.LocalDate",
    "java.time.LocalTime",
    "java.time.LocalDateTime",
    "java.time.ZonedDateTime",
    "java.time.OffsetDateTime",
    "java.time.ZoneId",
    "java.time.ZoneOffset",
    "java.time.Clock",
    "java.time.DayOfWeek",
    "java.time.Month",
    "java.time.format.DateTimeFormatter",
    "java.time.temporal.ChronoUnit",
    // java.text
    "java.text.SimpleDateFormat",
    "java.text.DecimalFormat",
    "java.text.NumberFormat",
    "java.text.MessageFormat",
    // java.net
    "java.net.URI",
    "java.net.URL",
    "java.net.Socket",
    "java.net.InetAddress",
    "java.net.URLEncoder",
    "java.net.URLDecoder",
    // javax
    "javax.annotation.Nullable",
    "javax.annotation.Nonnull",
    "javax.annotation.PostConstruct",
    "javax.annotation.PreDestroy",
];

/// (owner, field, field type)
const PLATFORM_FIELDS: &[(&str, &str, &str)] = &[
    ("java.lang.System", "out", "java.io.PrintStream"),
    ("java.lang.System", "err", "java.io.PrintStream"),
    ("java.lang.System", "in", "java.io.InputStream"),
    ("java.lang.Integer", "MAX_VALUE", "int"),
    ("java.lang.Integer", "MIN_VALUE", "int"),
    ("java.lang.Long", "MAX_VALUE", "long"),
    ("java.lang.Long", "MIN_VALUE", "long"),
    ("java.lang.Boolean", "TRUE", "java.lang.Boolean"),
    ("java.lang.Boolean", "FALSE", "java.lang.Boolean"),
    ("java.lang.Math", "PI", "double"),
    ("java.lang.Math", "E", "double"),
    ("java.math.BigDecimal", "ZERO", "java.math.BigDecimal"),
    ("java.math.BigDecimal", "ONE", "java.math.BigDecimal"),
    ("java.math.BigDecimal", "TEN", "java.math.BigDecimal"),
    ("java.math.BigInteger", "ZERO", "java.math.BigInteger"),
    ("java.math.BigInteger", "ONE", "java.math.BigInteger"),
    ("java.nio.charset.StandardCharsets", "UTF_8", "java.nio.charset.Charset"),
    ("java.nio.charset.StandardCharsets", "US_ASCII", "java.nio.charset.Charset"),
    ("java.util.concurrent.TimeUnit", "SECONDS", "java.util.concurrent.TimeUnit"),
    ("java.util.concurrent.TimeUnit", "MILLISECONDS", "java.util.concurrent.TimeUnit"),
];

/// Built-in platform types, known by name, plus a few well-known constants.
///
/// Always the last link of the chain.
pub struct PlatformTypeResolver {
    types: HashSet<&'static str>,
    packages: HashSet<String>,
}

impl PlatformTypeResolver {
    pub fn new() -> Self {
        let types: HashSet<&'static str> = PLATFORM_TYPES.iter().copied().collect();
        let packages = PLATFORM_TYPES
            .iter()
            .filter(|name| !name.starts_with("java.util.Map."))
            .filter_map(|name| name.rsplit_once('.').map(|(package, _)| package.to_string()))
            .collect();
        Self { types, packages }
    }

    fn fields_of(&self, qualified_name: &str) -> Vec<FieldDeclaration> {
        PLATFORM_FIELDS
            .iter()
            .filter(|(owner, _, _)| *owner == qualified_name)
            .map(|(_, name, type_text)| FieldDeclaration {
                name: name.to_string(),
                type_text: type_text.to_string(),
                is_static: true,
            })
            .collect()
    }
}

impl Default for PlatformTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver for PlatformTypeResolver {
    fn origin(&self) -> TypeOrigin {
        TypeOrigin::Platform
    }

    fn describe(&self) -> String {
        "platform".to_string()
    }

    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType> {
        if !self.types.contains(qualified_name) {
            return None;
        }
        Some(SolvedType::Opaque {
            qualified_name: qualified_name.to_string(),
            origin: TypeOrigin::Platform,
            fields: self.fields_of(qualified_name),
        })
    }

    fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_are_opaque() {
        let resolver = PlatformTypeResolver::new();

        let solved = resolver.solve_type("java.util.ArrayList").unwrap();

        assert!(solved.is_opaque());
        assert_eq!(solved.origin(), TypeOrigin::Platform);
        assert!(resolver.solve_type("com.acme.Service").is_none());
    }

    #[test]
    fn test_system_out_is_described() {
        let resolver = PlatformTypeResolver::new();

        let Some(SolvedType::Opaque { fields, .. }) = resolver.solve_type("java.lang.System") else {
            panic!("System should be known");
        };

        let out = fields.iter().find(|f| f.name == "out").unwrap();
        assert_eq!(out.type_text, "java.io.PrintStream");
    }

    #[test]
    fn test_packages() {
        let resolver = PlatformTypeResolver::new();

        assert!(resolver.has_package("java.util"));
        assert!(resolver.has_package("java.util.function"));
        assert!(!resolver.has_package("java.util.Map"));
        assert!(!resolver.has_package("com.acme"));
    }
}
